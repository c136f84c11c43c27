//! Where generated documents go

use crate::error::{MailMergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One generated document, ready to be stored
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub record_index: usize,
    pub client_id: String,
    /// Kind label, e.g. `Renovacion`
    pub kind: String,
    /// Relative folder: `<kind folder>/<client id>`
    pub folder: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl GeneratedDocument {
    /// `folder/file_name`
    pub fn relative_path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

/// Where a delivered document ended up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocation {
    /// Local file written
    pub path: PathBuf,
    /// Shareable link when the document was published
    pub url: Option<String>,
    /// Shareable link of the PDF copy, if one was produced
    pub pdf_url: Option<String>,
}

/// Receives every generated document of a merge run
pub trait OutputSink {
    fn deliver(&mut self, document: &GeneratedDocument) -> Result<OutputLocation>;
}

/// Writes documents under a root directory, creating folders as needed
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn deliver(&mut self, document: &GeneratedDocument) -> Result<OutputLocation> {
        let dir = self.root.join(&document.folder);
        std::fs::create_dir_all(&dir).map_err(|e| {
            MailMergeError::Output(format!("cannot create {}: {}", dir.display(), e))
        })?;
        let path = dir.join(&document.file_name);
        std::fs::write(&path, &document.bytes)?;
        Ok(OutputLocation {
            path,
            url: None,
            pdf_url: None,
        })
    }
}

/// Keeps documents in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub documents: Vec<GeneratedDocument>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn deliver(&mut self, document: &GeneratedDocument) -> Result<OutputLocation> {
        self.documents.push(document.clone());
        Ok(OutputLocation {
            path: document.relative_path(),
            ..Default::default()
        })
    }
}
