//! Story - a paragraph-bearing area (document body, header, footer)

use crate::{NodeId, Paragraph, Table};
use serde::{Deserialize, Serialize};

/// Top-level content of one area of a document.
///
/// Paragraphs and tables are kept as two ordered sequences; their relative
/// interleaving is not modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> NodeId {
        let id = paragraph.id();
        self.paragraphs.push(paragraph);
        id
    }

    pub fn add_table(&mut self, table: Table) -> NodeId {
        let id = table.id();
        self.tables.push(table);
        id
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Find a top-level paragraph by id
    pub fn paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.paragraphs.iter().find(|p| p.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }

    /// Visit top-level paragraphs, then every table paragraph
    pub fn for_each_paragraph<'a>(&'a self, f: &mut dyn FnMut(&'a Paragraph)) {
        for paragraph in &self.paragraphs {
            f(paragraph);
        }
        for table in &self.tables {
            table.for_each_paragraph(f);
        }
    }

    pub fn for_each_paragraph_mut(&mut self, f: &mut dyn FnMut(&mut Paragraph)) {
        for paragraph in &mut self.paragraphs {
            f(paragraph);
        }
        for table in &mut self.tables {
            table.for_each_paragraph_mut(f);
        }
    }
}
