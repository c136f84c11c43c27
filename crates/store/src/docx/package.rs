//! In-memory OOXML package: every ZIP entry, in archive order

use crate::docx::error::{DocxError, DocxResult};
use zip::CompressionMethod;

/// One ZIP entry of a package
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Entry name inside the archive, e.g. `word/document.xml`
    pub name: String,
    pub is_dir: bool,
    /// Compression method the entry was stored with
    pub compression: CompressionMethod,
    pub data: Vec<u8>,
}

/// All entries of a DOCX package.
///
/// Entries are kept byte-for-byte; only the parts a caller replaces are
/// written back differently.
#[derive(Debug, Clone, Default)]
pub struct Package {
    entries: Vec<PackageEntry>,
}

impl Package {
    pub fn from_entries(entries: Vec<PackageEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Raw bytes of a part
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entry(name).map(|e| e.data.as_slice())
    }

    /// A part decoded as UTF-8 text
    pub fn get_string(&self, name: &str) -> DocxResult<String> {
        let data = self
            .get(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        let text = std::str::from_utf8(data).map_err(|_| DocxError::Utf8(name.to_string()))?;
        // Parts may start with a UTF-8 byte order mark
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    /// Replace the content of an existing part, keeping its position and compression
    pub fn replace(&mut self, name: &str, data: Vec<u8>) -> DocxResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        entry.data = data;
        Ok(())
    }
}

/// Relationships part that belongs to `part_name`,
/// e.g. `word/document.xml` -> `word/_rels/document.xml.rels`
pub fn rels_part_name(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Absolute targets (`/word/header1.xml`) are rooted at the package; relative
/// ones are resolved from the source part's directory, with `..` segments
/// collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        match source_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, target),
            None => target.to_string(),
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
