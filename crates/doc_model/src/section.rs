//! Sections and their header/footer references

use crate::{NodeId, Story};
use serde::{Deserialize, Serialize};

/// Which pages a header or footer applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderFooterKind {
    Default,
    FirstPage,
    Even,
}

impl HeaderFooterKind {
    /// Parse the `w:type` value of a header/footer reference
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "first" => Some(Self::FirstPage),
            "even" => Some(Self::Even),
            _ => None,
        }
    }
}

/// A header or footer part.
///
/// One part may be referenced by several sections; it is stored once on the
/// document and referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderFooter {
    id: NodeId,
    /// Package part name, e.g. `word/footer1.xml`
    pub part_name: Option<String>,
    /// Content of the part
    pub content: Story,
}

impl HeaderFooter {
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            part_name: None,
            content: Story::new(),
        }
    }

    pub fn with_content(content: Story) -> Self {
        Self {
            id: NodeId::new(),
            part_name: None,
            content,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Default for HeaderFooter {
    fn default() -> Self {
        Self::new()
    }
}

/// References from a section to its header (or footer) parts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFooterSet {
    pub default: Option<NodeId>,
    pub first_page: Option<NodeId>,
    pub even: Option<NodeId>,
}

impl HeaderFooterSet {
    pub fn get(&self, kind: HeaderFooterKind) -> Option<NodeId> {
        match kind {
            HeaderFooterKind::Default => self.default,
            HeaderFooterKind::FirstPage => self.first_page,
            HeaderFooterKind::Even => self.even,
        }
    }

    pub fn set(&mut self, kind: HeaderFooterKind, id: NodeId) {
        match kind {
            HeaderFooterKind::Default => self.default = Some(id),
            HeaderFooterKind::FirstPage => self.first_page = Some(id),
            HeaderFooterKind::Even => self.even = Some(id),
        }
    }

    pub fn has_any(&self) -> bool {
        self.default.is_some() || self.first_page.is_some() || self.even.is_some()
    }
}

/// A document section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Section {
    pub headers: HeaderFooterSet,
    pub footers: HeaderFooterSet,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }
}
