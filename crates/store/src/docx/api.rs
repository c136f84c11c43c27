//! Public API for DOCX templates
//!
//! A [`DocxTemplate`] is a loaded package whose text can be edited through
//! the [`Document`] model and written back with everything else intact.

use crate::docx::document_writer::PartWriter;
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::Package;
use crate::docx::parser::DocxParser;
use crate::docx::part::PartXml;
use crate::docx::writer::DocxWriter;
use doc_model::{Document, Story};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;

/// A `.docx` file opened for text substitution.
///
/// Only run-level edits are written back: paragraphs added to or removed from
/// the model are not reflected in the output package.
#[derive(Debug)]
pub struct DocxTemplate {
    package: Package,
    document: Document,
    main_part: String,
    parts: Vec<PartXml>,
}

impl DocxTemplate {
    /// Open a template from disk
    ///
    /// # Example
    ///
    /// ```ignore
    /// use store::docx::DocxTemplate;
    ///
    /// let mut template = DocxTemplate::open("RENOVACION_202X_CLIENTE.docx")?;
    /// template.document_mut();
    /// template.save("out/Comunicado_2025_900123456.docx")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> DocxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            } else {
                DocxError::Io(e)
            }
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a template from in-memory bytes
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let parsed = DocxParser::parse(reader)?;
        Ok(Self {
            package: parsed.package,
            document: parsed.document,
            main_part: parsed.main_part,
            parts: parsed.parts,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Name of the main document part inside the package
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Serialize to `.docx` bytes
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Serialize into any seekable writer and hand it back
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> DocxResult<W> {
        let overrides = self.rewritten_parts()?;
        DocxWriter::new(writer).write(&self.package, &overrides)
    }

    /// Write to disk, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> DocxResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Serialized XML of every text part whose paragraphs changed
    fn rewritten_parts(&self) -> DocxResult<HashMap<String, Vec<u8>>> {
        let mut overrides = HashMap::new();
        for part in &self.parts {
            let Some(story) = self.story_for(&part.name) else {
                continue;
            };
            let mut paragraphs = HashMap::new();
            story.for_each_paragraph(&mut |p| {
                paragraphs.insert(p.id(), p);
            });
            if part.is_unchanged(&paragraphs) {
                continue;
            }
            debug!(part = %part.name, "rewriting changed part");
            overrides.insert(part.name.clone(), PartWriter::new(part).write(&paragraphs)?);
        }
        Ok(overrides)
    }

    fn story_for(&self, part_name: &str) -> Option<&Story> {
        if part_name == self.main_part {
            return Some(self.document.body());
        }
        self.document
            .headers()
            .iter()
            .chain(self.document.footers())
            .find(|part| part.part_name.as_deref() == Some(part_name))
            .map(|part| &part.content)
    }
}
