//! Paragraph node - an ordered sequence of runs

use crate::{NodeId, Run};
use serde::{Deserialize, Serialize};

/// A paragraph containing text runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    id: NodeId,
    runs: Vec<Run>,
    /// Paragraph style ID reference (e.g., "Heading1")
    pub style_id: Option<String>,
}

impl Paragraph {
    /// Create an empty paragraph
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            runs: Vec::new(),
            style_id: None,
        }
    }

    /// Create a paragraph holding a single unformatted run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::from_runs(vec![Run::new(text)])
    }

    /// Create a paragraph from existing runs
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            id: NodeId::new(),
            runs,
            style_id: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Append a run
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Remove every run
    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Full paragraph text: run texts concatenated in order
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.runs.iter().map(Run::len).sum());
        for run in &self.runs {
            text.push_str(&run.text);
        }
        text
    }

    /// Drop all runs and replace them with one unformatted run of `text`.
    ///
    /// Per-run formatting is lost; paragraph-level properties are kept.
    pub fn replace_runs_with_text(&mut self, text: impl Into<String>) {
        self.runs.clear();
        self.runs.push(Run::new(text));
    }

    /// True when the paragraph has no text
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}
