//! Paragraph-bearing regions of a document and region selection

use serde::{Deserialize, Serialize};

/// Where a paragraph lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Top-level body paragraph
    Body,
    /// Paragraph inside a body table cell (any nesting depth)
    TableCell,
    /// Paragraph inside a header part, its tables included
    Header,
    /// Paragraph inside a footer part, its tables included
    Footer,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Body => "body",
            Region::TableCell => "table_cell",
            Region::Header => "header",
            Region::Footer => "footer",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which regions a document walk visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    pub body: bool,
    pub table_cells: bool,
    pub headers: bool,
    pub footers: bool,
}

impl RegionSet {
    /// Every region
    pub fn all() -> Self {
        Self {
            body: true,
            table_cells: true,
            headers: true,
            footers: true,
        }
    }

    /// Body paragraphs and body tables only
    pub fn body_and_tables() -> Self {
        Self {
            body: true,
            table_cells: true,
            headers: false,
            footers: false,
        }
    }

    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.headers = enabled;
        self
    }

    pub fn with_footers(mut self, enabled: bool) -> Self {
        self.footers = enabled;
        self
    }

    pub fn contains(&self, region: Region) -> bool {
        match region {
            Region::Body => self.body,
            Region::TableCell => self.table_cells,
            Region::Header => self.headers,
            Region::Footer => self.footers,
        }
    }
}

impl Default for RegionSet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_set_builders() {
        let set = RegionSet::body_and_tables().with_footers(true);
        assert!(set.contains(Region::Body));
        assert!(set.contains(Region::TableCell));
        assert!(!set.contains(Region::Header));
        assert!(set.contains(Region::Footer));
        assert_eq!(RegionSet::default(), RegionSet::all());
    }

    #[test]
    fn test_region_serialization() {
        assert_eq!(serde_json::to_string(&Region::TableCell).unwrap(), "\"table_cell\"");
    }
}
