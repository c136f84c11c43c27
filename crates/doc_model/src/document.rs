//! Document root and region-aware paragraph walks

use crate::{
    DocModelError, HeaderFooter, HeaderFooterKind, NodeId, Paragraph, Region, RegionSet, Result,
    Section, Story, Table,
};
use serde::{Deserialize, Serialize};

/// A loaded document: body, sections, and the header/footer parts the
/// sections reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: NodeId,
    body: Story,
    sections: Vec<Section>,
    headers: Vec<HeaderFooter>,
    footers: Vec<HeaderFooter>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            body: Story::new(),
            sections: Vec::new(),
            headers: Vec::new(),
            footers: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn body(&self) -> &Story {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Story {
        &mut self.body
    }

    /// Top-level body paragraphs
    pub fn paragraphs(&self) -> &[Paragraph] {
        self.body.paragraphs()
    }

    /// Top-level body tables
    pub fn tables(&self) -> &[Table] {
        self.body.tables()
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> NodeId {
        self.body.add_paragraph(paragraph)
    }

    pub fn add_table(&mut self, table: Table) -> NodeId {
        self.body.add_table(table)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn headers(&self) -> &[HeaderFooter] {
        &self.headers
    }

    pub fn footers(&self) -> &[HeaderFooter] {
        &self.footers
    }

    /// Register a header part and return its id
    pub fn add_header(&mut self, header: HeaderFooter) -> NodeId {
        let id = header.id();
        self.headers.push(header);
        id
    }

    /// Register a footer part and return its id
    pub fn add_footer(&mut self, footer: HeaderFooter) -> NodeId {
        let id = footer.id();
        self.footers.push(footer);
        id
    }

    pub fn header(&self, id: NodeId) -> Option<&HeaderFooter> {
        self.headers.iter().find(|h| h.id() == id)
    }

    pub fn footer(&self, id: NodeId) -> Option<&HeaderFooter> {
        self.footers.iter().find(|f| f.id() == id)
    }

    /// Header shown by a section, following Word's inheritance: a section
    /// without its own reference of `kind` uses the previous section's.
    pub fn section_header(&self, section: usize, kind: HeaderFooterKind) -> Result<Option<&HeaderFooter>> {
        self.resolve_inherited(section, kind, |s| &s.headers, |id| self.header(id))
    }

    /// Footer shown by a section, with the same inheritance as headers
    pub fn section_footer(&self, section: usize, kind: HeaderFooterKind) -> Result<Option<&HeaderFooter>> {
        self.resolve_inherited(section, kind, |s| &s.footers, |id| self.footer(id))
    }

    fn resolve_inherited<'a>(
        &'a self,
        section: usize,
        kind: HeaderFooterKind,
        set: impl Fn(&'a Section) -> &'a crate::HeaderFooterSet,
        lookup: impl Fn(NodeId) -> Option<&'a HeaderFooter>,
    ) -> Result<Option<&'a HeaderFooter>> {
        if section >= self.sections.len() {
            return Err(DocModelError::InvalidOperation(format!(
                "section {} out of range ({} sections)",
                section,
                self.sections.len()
            )));
        }
        for candidate in self.sections[..=section].iter().rev() {
            if let Some(id) = set(candidate).get(kind) {
                return lookup(id).map(Some).ok_or(DocModelError::NodeNotFound(id));
            }
        }
        Ok(None)
    }

    /// Visit every paragraph in the selected regions: body paragraphs, body
    /// table cells, then each header part and each footer part once.
    pub fn for_each_paragraph<'a>(&'a self, regions: RegionSet, mut f: impl FnMut(Region, &'a Paragraph)) {
        if regions.body {
            for paragraph in self.body.paragraphs() {
                f(Region::Body, paragraph);
            }
        }
        if regions.table_cells {
            for table in self.body.tables() {
                table.for_each_paragraph(&mut |p| f(Region::TableCell, p));
            }
        }
        if regions.headers {
            for header in &self.headers {
                header.content.for_each_paragraph(&mut |p| f(Region::Header, p));
            }
        }
        if regions.footers {
            for footer in &self.footers {
                footer.content.for_each_paragraph(&mut |p| f(Region::Footer, p));
            }
        }
    }

    /// Mutable counterpart of [`Document::for_each_paragraph`]
    pub fn for_each_paragraph_mut(&mut self, regions: RegionSet, mut f: impl FnMut(Region, &mut Paragraph)) {
        if regions.body {
            for paragraph in self.body.paragraphs_mut() {
                f(Region::Body, paragraph);
            }
        }
        if regions.table_cells {
            for table in self.body.tables_mut() {
                table.for_each_paragraph_mut(&mut |p| f(Region::TableCell, p));
            }
        }
        if regions.headers {
            for header in &mut self.headers {
                header.content.for_each_paragraph_mut(&mut |p| f(Region::Header, p));
            }
        }
        if regions.footers {
            for footer in &mut self.footers {
                footer.content.for_each_paragraph_mut(&mut |p| f(Region::Footer, p));
            }
        }
    }

    /// Number of paragraphs in the selected regions
    pub fn paragraph_count(&self, regions: RegionSet) -> usize {
        let mut count = 0;
        self.for_each_paragraph(regions, |_, _| count += 1);
        count
    }

    /// Paragraph texts of the selected regions, one per line, in walk order
    pub fn plain_text(&self, regions: RegionSet) -> String {
        let mut lines = Vec::new();
        self.for_each_paragraph(regions, |_, p| lines.push(p.text()));
        lines.join("\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
