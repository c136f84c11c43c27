//! DOCX template I/O
//!
//! A DOCX file is a ZIP archive containing XML parts:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships, naming the main document part
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships (headers, footers, media)
//! - `word/header*.xml`, `word/footer*.xml` - Header and footer content
//!
//! Templates are loaded into a [`doc_model::Document`] for editing. On save,
//! only the text parts whose paragraphs changed are re-serialized, and every
//! other entry is written back with its original content.

mod api;
mod document;
mod document_writer;
mod error;
mod package;
mod parser;
mod part;
mod reader;
mod relationships;
mod writer;

pub use api::DocxTemplate;
pub use error::{DocxError, DocxResult};
pub use package::{rels_part_name, resolve_target, Package, PackageEntry};
pub use relationships::{Relationship, Relationships, TargetMode};

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
}
