//! Relationships (.rels) file parsing
//!
//! DOCX uses relationships to connect parts of the package together: the root
//! `.rels` names the main document part, and the document's own `.rels` names
//! its header and footer parts.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::resolve_target;
use crate::docx::reader::XmlParser;
use quick_xml::events::Event;

/// A single relationship in a .rels file
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Relationships declared by one part, in file order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    source_part: String,
    relationships: Vec<Relationship>,
}

impl Relationships {
    /// Empty collection for a part that has no .rels file
    pub fn empty(source_part: impl Into<String>) -> Self {
        Self {
            source_part: source_part.into(),
            relationships: Vec::new(),
        }
    }

    /// Parse a .rels file declared by `source_part` (`""` for the package root)
    pub fn parse(source_part: &str, content: &str) -> DocxResult<Self> {
        let mut result = Self::empty(source_part);
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Relationship") {
                        let id = XmlParser::get_attribute(e, b"Id")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Id".into()))?;
                        let rel_type = XmlParser::get_attribute(e, b"Type")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Type".into()))?;
                        let target = XmlParser::get_attribute(e, b"Target")
                            .ok_or_else(|| DocxError::RelationshipError("Relationship missing Target".into()))?;
                        let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                            .map(|m| if m == "External" { TargetMode::External } else { TargetMode::Internal })
                            .unwrap_or_default();

                        result.relationships.push(Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::xml(&format!("{} rels", source_part), e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// Get the first relationship of a type
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    /// Get all relationships of a given type, in file order
    pub fn get_all_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }

    /// Package part name an internal relationship points at
    pub fn resolve(&self, rel: &Relationship) -> Option<String> {
        match rel.target_mode {
            TargetMode::Internal => Some(resolve_target(&self.source_part, &rel.target)),
            TargetMode::External => None,
        }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::relationship_types;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
    <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="/word/header2.xml"/>
</Relationships>"#;

    #[test]
    fn test_relationships_parsing() {
        let rels = Relationships::parse("word/document.xml", DOCUMENT_RELS).unwrap();
        assert_eq!(rels.len(), 4);

        let footer = rels.get("rId3").unwrap();
        assert_eq!(footer.target, "footer1.xml");
        assert_eq!(footer.target_mode, TargetMode::Internal);

        let link = rels.get("rId2").unwrap();
        assert_eq!(link.target_mode, TargetMode::External);
        assert_eq!(rels.resolve(link), None);
    }

    #[test]
    fn test_headers_in_file_order_and_resolved() {
        let rels = Relationships::parse("word/document.xml", DOCUMENT_RELS).unwrap();
        let headers: Vec<String> = rels
            .get_all_by_type(relationship_types::HEADER)
            .into_iter()
            .filter_map(|r| rels.resolve(r))
            .collect();
        assert_eq!(headers, vec!["word/header1.xml", "word/header2.xml"]);
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let xml = r#"<Relationships><Relationship Id="rId1" Target="x.xml"/></Relationships>"#;
        assert!(matches!(
            Relationships::parse("", xml),
            Err(DocxError::RelationshipError(_))
        ));
    }
}
