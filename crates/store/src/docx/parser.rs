//! Package loading
//!
//! Coordinates reading the ZIP package, following relationships from the
//! package root to the main document part and from there to every header
//! and footer part, and assembling the [`Document`].

use crate::docx::document::{ParsedPart, StoryParser};
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::{rels_part_name, Package};
use crate::docx::part::PartXml;
use crate::docx::reader::DocxReader;
use crate::docx::relationship_types;
use crate::docx::relationships::Relationships;
use doc_model::{Document, HeaderFooter, NodeId, Section};
use std::collections::HashMap;
use std::io::{Read, Seek};
use tracing::{debug, warn};

/// Everything read from a package
#[derive(Debug)]
pub struct ParsedDocx {
    pub package: Package,
    pub document: Document,
    /// Main document part name, e.g. `word/document.xml`
    pub main_part: String,
    /// Parsed text parts, main part first, then headers, then footers
    pub parts: Vec<PartXml>,
}

/// Main parser for DOCX files
pub struct DocxParser;

impl DocxParser {
    pub fn parse<R: Read + Seek>(reader: R) -> DocxResult<ParsedDocx> {
        let package = DocxReader::new(reader)?.read_package()?;

        let root_rels = Relationships::parse("", &package.get_string("_rels/.rels")?)?;
        let main_rel = root_rels
            .get_by_type(relationship_types::DOCUMENT)
            .ok_or_else(|| DocxError::MissingPart("officeDocument relationship".to_string()))?;
        let main_part = root_rels.resolve(main_rel).ok_or_else(|| {
            DocxError::RelationshipError("main document target is external".to_string())
        })?;

        let ParsedPart {
            xml: main_xml,
            story,
            sections,
        } = StoryParser::parse(&main_part, &package.get_string(&main_part)?)?;

        let rels_name = rels_part_name(&main_part);
        let doc_rels = if package.contains(&rels_name) {
            Relationships::parse(&main_part, &package.get_string(&rels_name)?)?
        } else {
            Relationships::empty(main_part.as_str())
        };

        let mut document = Document::new();
        *document.body_mut() = story;
        let mut parts = vec![main_xml];

        // A part referenced by several relationships is parsed once
        let mut by_part: HashMap<String, NodeId> = HashMap::new();
        let mut by_rel: HashMap<&str, NodeId> = HashMap::new();

        for (rel_type, is_header) in [(relationship_types::HEADER, true), (relationship_types::FOOTER, false)] {
            for rel in doc_rels.get_all_by_type(rel_type) {
                let Some(part_name) = doc_rels.resolve(rel) else {
                    continue;
                };
                if let Some(id) = by_part.get(&part_name) {
                    by_rel.insert(rel.id.as_str(), *id);
                    continue;
                }
                if !package.contains(&part_name) {
                    warn!(part = %part_name, rel_id = %rel.id, "referenced part missing from package");
                    continue;
                }

                let parsed = StoryParser::parse(&part_name, &package.get_string(&part_name)?)?;
                let mut part = HeaderFooter::with_content(parsed.story);
                part.part_name = Some(part_name.clone());
                let id = if is_header {
                    document.add_header(part)
                } else {
                    document.add_footer(part)
                };
                debug!(part = %part_name, header = is_header, "loaded header/footer part");

                by_part.insert(part_name, id);
                by_rel.insert(rel.id.as_str(), id);
                parts.push(parsed.xml);
            }
        }

        for references in sections {
            let mut section = Section::new();
            for (kind, rel_id) in &references.headers {
                match by_rel.get(rel_id.as_str()) {
                    Some(id) => section.headers.set(*kind, *id),
                    None => warn!(rel_id = %rel_id, "section references unknown header"),
                }
            }
            for (kind, rel_id) in &references.footers {
                match by_rel.get(rel_id.as_str()) {
                    Some(id) => section.footers.set(*kind, *id),
                    None => warn!(rel_id = %rel_id, "section references unknown footer"),
                }
            }
            document.add_section(section);
        }

        Ok(ParsedDocx {
            package,
            document,
            main_part,
            parts,
        })
    }
}
