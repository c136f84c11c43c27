//! Source event streams of the text-bearing XML parts
//!
//! A part is kept as the exact event sequence it was read as, plus the index
//! ranges of every paragraph and run the document model was built from. The
//! writer uses those ranges to re-emit untouched paragraphs verbatim.

use crate::docx::reader::WordNames;
use doc_model::{HeaderFooterKind, NodeId, Paragraph};
use quick_xml::events::Event;
use std::collections::HashMap;

/// Inclusive range of event indices
pub type EventRange = (usize, usize);

/// One parsed XML part (main document, header or footer)
#[derive(Debug, Clone)]
pub struct PartXml {
    /// Package part name, e.g. `word/header1.xml`
    pub name: String,
    pub names: WordNames,
    pub events: Vec<Event<'static>>,
    /// Paragraph locations in document order
    pub paragraphs: Vec<ParagraphSpan>,
}

/// Where a model paragraph came from
#[derive(Debug, Clone)]
pub struct ParagraphSpan {
    /// Id of the model paragraph
    pub id: NodeId,
    /// Index of the `p` start (or empty) event
    pub start: usize,
    /// Index of the `p` end event; equal to `start` for `<w:p/>`
    pub end: usize,
    /// The `pPr` element, if any
    pub properties: Option<EventRange>,
    pub runs: Vec<RunSpan>,
}

/// Where a model run came from
#[derive(Debug, Clone)]
pub struct RunSpan {
    pub id: NodeId,
    pub start: usize,
    pub end: usize,
    /// The `rPr` element, if any
    pub properties: Option<EventRange>,
    /// Text as read
    pub text: String,
}

impl ParagraphSpan {
    /// Same runs, in the same order, with the same text as when read
    pub fn is_pristine(&self, paragraph: &Paragraph) -> bool {
        let runs = paragraph.runs();
        runs.len() == self.runs.len()
            && runs
                .iter()
                .zip(&self.runs)
                .all(|(run, source)| run.id() == source.id && run.text == source.text)
    }
}

impl PartXml {
    /// Whether no paragraph of this part differs from its source events.
    /// Paragraphs missing from `paragraphs` count as unchanged.
    pub fn is_unchanged(&self, paragraphs: &HashMap<NodeId, &Paragraph>) -> bool {
        self.paragraphs.iter().all(|span| {
            paragraphs
                .get(&span.id)
                .map_or(true, |paragraph| span.is_pristine(paragraph))
        })
    }
}

/// Header and footer references of one `sectPr`, by relationship id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionReferences {
    pub headers: Vec<(HeaderFooterKind, String)>,
    pub footers: Vec<(HeaderFooterKind, String)>,
}
