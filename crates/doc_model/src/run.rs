//! Text run - a contiguous span of text with one formatting definition

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Character formatting carried by a run.
///
/// Only the properties the merge pipeline inspects are modelled. Runs loaded
/// from a docx keep their original `w:rPr` markup in the package, so unknown
/// properties survive as long as the run itself is not rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Character style ID reference (e.g., "Strong")
    pub style_id: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Font family override
    pub font_family: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
    /// Text color as a hex string without `#` (e.g., "FF0000")
    pub color: Option<String>,
}

impl RunStyle {
    /// True when no property is set
    pub fn is_empty(&self) -> bool {
        *self == RunStyle::default()
    }
}

/// A text run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    /// Text content. Tabs are stored as `\t`, line breaks as `\n`.
    pub text: String,
    /// Formatting of this run
    pub style: RunStyle,
}

impl Run {
    /// Create an unformatted run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// Create a run with explicit formatting
    pub fn with_style(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            id: NodeId::new(),
            text: text.into(),
            style,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Length of the text in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_style_is_empty() {
        assert!(RunStyle::default().is_empty());
        let bold = RunStyle {
            bold: Some(true),
            ..Default::default()
        };
        assert!(!bold.is_empty());
    }

    #[test]
    fn test_runs_get_distinct_ids() {
        let a = Run::new("a");
        let b = Run::new("a");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.len(), 1);
    }
}
