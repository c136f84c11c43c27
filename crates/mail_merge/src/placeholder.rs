//! Placeholder syntaxes recognised in templates

use serde::{Deserialize, Serialize};
use store::SyntaxSetting;

/// One way of writing a placeholder around a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderSyntax {
    /// `${key}`
    DollarBrace,
    /// `$<key>`
    DollarAngle,
    /// `<key>`
    Angle,
    /// `« key»`, as Word writes converted merge fields
    Guillemet,
}

impl PlaceholderSyntax {
    /// Every syntax, in matching order
    pub const ALL: [PlaceholderSyntax; 4] = [
        PlaceholderSyntax::DollarBrace,
        PlaceholderSyntax::DollarAngle,
        PlaceholderSyntax::Angle,
        PlaceholderSyntax::Guillemet,
    ];

    /// The literal pattern for `key`
    pub fn render(&self, key: &str) -> String {
        match self {
            PlaceholderSyntax::DollarBrace => format!("${{{}}}", key),
            PlaceholderSyntax::DollarAngle => format!("$<{}>", key),
            PlaceholderSyntax::Angle => format!("<{}>", key),
            PlaceholderSyntax::Guillemet => format!("« {}»", key),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderSyntax::DollarBrace => "dollar_brace",
            PlaceholderSyntax::DollarAngle => "dollar_angle",
            PlaceholderSyntax::Angle => "angle",
            PlaceholderSyntax::Guillemet => "guillemet",
        }
    }
}

impl std::fmt::Display for PlaceholderSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of syntaxes a template is scanned for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    syntaxes: Vec<PlaceholderSyntax>,
}

impl PatternSet {
    /// Duplicates are dropped, keeping the first occurrence
    pub fn new(syntaxes: impl IntoIterator<Item = PlaceholderSyntax>) -> Self {
        let mut unique = Vec::new();
        for syntax in syntaxes {
            if !unique.contains(&syntax) {
                unique.push(syntax);
            }
        }
        Self { syntaxes: unique }
    }

    /// All four syntaxes
    pub fn standard() -> Self {
        Self::new(PlaceholderSyntax::ALL)
    }

    /// `<key>` and `« key»` only, for the older Comunicado templates
    pub fn legacy() -> Self {
        Self::new([PlaceholderSyntax::Angle, PlaceholderSyntax::Guillemet])
    }

    pub fn syntaxes(&self) -> &[PlaceholderSyntax] {
        &self.syntaxes
    }

    pub fn contains(&self, syntax: PlaceholderSyntax) -> bool {
        self.syntaxes.contains(&syntax)
    }

    pub fn is_empty(&self) -> bool {
        self.syntaxes.is_empty()
    }

    /// Patterns for `key`, in set order
    pub fn patterns_for(&self, key: &str) -> Vec<String> {
        self.syntaxes.iter().map(|s| s.render(key)).collect()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl From<SyntaxSetting> for PatternSet {
    fn from(setting: SyntaxSetting) -> Self {
        match setting {
            SyntaxSetting::Standard => PatternSet::standard(),
            SyntaxSetting::Legacy => PatternSet::legacy(),
        }
    }
}
