//! ZIP archive reading and XML parsing utilities

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::{Package, PackageEntry};
use quick_xml::events::BytesStart;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A wrapper around a ZIP archive for reading DOCX files
pub struct DocxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> DocxReader<R> {
    /// Create a new DOCX reader from a source that implements Read + Seek
    pub fn new(reader: R) -> DocxResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Check if a file exists in the archive
    pub fn file_exists(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Check if this looks like an OOXML package at all
    pub fn is_valid_package(&self) -> bool {
        self.file_exists("[Content_Types].xml") && self.file_exists("_rels/.rels")
    }

    /// Read every entry, in archive order, keeping its compression method
    pub fn read_package(mut self) -> DocxResult<Package> {
        if !self.is_valid_package() {
            return Err(DocxError::InvalidStructure(
                "missing [Content_Types].xml or _rels/.rels".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                compression: file.compression(),
                data,
            });
        }
        Ok(Package::from_entries(entries))
    }
}

/// XML reader utilities for parsing DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Reader that keeps whitespace and empty elements exactly as written
    pub fn verbatim(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = false;
        reader
    }

    /// Reader for small metadata parts where whitespace is irrelevant
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Get an attribute value by its exact qualified name
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Get an attribute value by local name, whatever prefix the part uses
    pub fn get_local_attribute(event: &BytesStart, local: &str) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.local_name().as_ref() == local.as_bytes())
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Parse a half-point value to points
    /// DOCX uses half-points for font sizes
    pub fn parse_half_points(value: &str) -> Option<f32> {
        value.parse::<f32>().ok().map(|v| v / 2.0)
    }

    /// Parse an OOXML on/off value (0/1, true/false, on/off)
    pub fn parse_bool(value: &str) -> bool {
        matches!(value.to_lowercase().as_str(), "1" | "true" | "on" | "yes")
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }
}

/// Qualified element names for the WordprocessingML prefix a part declares.
///
/// Most packages bind the namespace to `w`, but the prefix is whatever the
/// root element declares, and DrawingML (`a:p`, `a:r`, `a:t`) or math
/// (`m:r`, `m:t`) elements must never be mistaken for paragraphs or runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordNames {
    prefix: String,
}

impl WordNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Read the prefix bound to the WordprocessingML namespace on a root element
    pub fn from_root(root: &BytesStart) -> Self {
        for attr in root.attributes().filter_map(|a| a.ok()) {
            if attr.value.as_ref() != crate::docx::namespaces::W.as_bytes() {
                continue;
            }
            let key = attr.key.as_ref();
            if key == b"xmlns" {
                return Self::new("");
            }
            if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                return Self::new(String::from_utf8_lossy(prefix).to_string());
            }
        }
        Self::new("w")
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Qualified name for a local element name, e.g. `w:t`
    pub fn qualify(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }

    /// Whether `name` is the WordprocessingML element `local`
    pub fn is(&self, name: &[u8], local: &str) -> bool {
        if self.prefix.is_empty() {
            return name == local.as_bytes();
        }
        let prefix = self.prefix.as_bytes();
        name.len() == prefix.len() + 1 + local.len()
            && name.starts_with(prefix)
            && name[prefix.len()] == b':'
            && name.ends_with(local.as_bytes())
    }

    /// Local part of `name` when it is a WordprocessingML element
    pub fn local<'a>(&self, name: &'a [u8]) -> Option<&'a [u8]> {
        if self.prefix.is_empty() {
            return (!name.contains(&b':')).then_some(name);
        }
        let prefix = self.prefix.as_bytes();
        if name.len() > prefix.len() && name.starts_with(prefix) && name[prefix.len()] == b':' {
            Some(&name[prefix.len() + 1..])
        } else {
            None
        }
    }
}
