//! Tables: rows of cells, each cell holding its own paragraphs

use crate::{NodeId, Paragraph};
use serde::{Deserialize, Serialize};

/// A table cell
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    /// Paragraphs directly inside the cell
    pub paragraphs: Vec<Paragraph>,
    /// Tables nested inside the cell
    pub tables: Vec<Table>,
}

impl TableCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell with one paragraph of plain text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![Paragraph::with_text(text)],
            tables: Vec::new(),
        }
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

    /// Paragraph texts joined with newlines (nested tables excluded)
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    pub fn add_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }
}

/// A table - an ordered grid of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    id: NodeId,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            rows: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row; rows may be ragged after merges
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Visit every paragraph in the table, nested tables included, row by row
    pub fn for_each_paragraph<'a>(&'a self, f: &mut dyn FnMut(&'a Paragraph)) {
        for row in &self.rows {
            for cell in &row.cells {
                for paragraph in &cell.paragraphs {
                    f(paragraph);
                }
                for nested in &cell.tables {
                    nested.for_each_paragraph(f);
                }
            }
        }
    }

    /// Mutable counterpart of [`Table::for_each_paragraph`]
    pub fn for_each_paragraph_mut(&mut self, f: &mut dyn FnMut(&mut Paragraph)) {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                for paragraph in &mut cell.paragraphs {
                    f(paragraph);
                }
                for nested in &mut cell.tables {
                    nested.for_each_paragraph_mut(f);
                }
            }
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
