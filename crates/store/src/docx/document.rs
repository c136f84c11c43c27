//! Text part parser
//!
//! Parses `document.xml`, `header*.xml` and `footer*.xml` into a
//! [`Story`] while recording where each paragraph and run sits in the part's
//! event stream.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::part::{ParagraphSpan, PartXml, RunSpan, SectionReferences};
use crate::docx::reader::{WordNames, XmlParser};
use doc_model::{HeaderFooterKind, Paragraph, Run, RunStyle, Story, Table, TableCell, TableRow};
use quick_xml::events::{BytesStart, Event};

/// Result of parsing one text part
#[derive(Debug)]
pub struct ParsedPart {
    pub xml: PartXml,
    pub story: Story,
    /// `sectPr` elements in document order (main part only)
    pub sections: Vec<SectionReferences>,
}

/// Parser for the paragraph-bearing parts of a package
pub struct StoryParser;

impl StoryParser {
    pub fn parse(part_name: &str, content: &str) -> DocxResult<ParsedPart> {
        let events = Self::read_events(part_name, content)?;
        let names = events
            .iter()
            .find_map(|event| match event {
                Event::Start(root) | Event::Empty(root) => Some(WordNames::from_root(root)),
                _ => None,
            })
            .unwrap_or_else(|| WordNames::new("w"));

        let mut builder = StoryBuilder::new(&names, part_name);
        for (index, event) in events.iter().enumerate() {
            builder.handle(index, event)?;
        }
        let (story, paragraphs, sections) = builder.finish()?;

        Ok(ParsedPart {
            xml: PartXml {
                name: part_name.to_string(),
                names,
                events,
                paragraphs,
            },
            story,
            sections,
        })
    }

    fn read_events(part_name: &str, content: &str) -> DocxResult<Vec<Event<'static>>> {
        let mut reader = XmlParser::verbatim(content);
        let mut events = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => events.push(event.into_owned()),
                Err(e) => return Err(DocxError::xml(part_name, e)),
            }
        }
        Ok(events)
    }
}

enum Container {
    Table(Table),
    Row(TableRow),
    Cell(TableCell),
}

struct OpenParagraph {
    paragraph: Paragraph,
    span: ParagraphSpan,
    properties_start: Option<usize>,
    /// `w:pPr` elements open inside the outer one (`w:pPrChange` history)
    properties_depth: usize,
    /// Paragraphs nested inside this one (text boxes); their content is skipped
    nested: usize,
}

struct OpenRun {
    start: usize,
    properties_start: Option<usize>,
    properties: Option<(usize, usize)>,
    in_properties: bool,
    /// `w:rPr` elements open inside the outer one (`w:rPrChange` history)
    properties_depth: usize,
    in_text: bool,
    text: String,
    style: RunStyle,
}

impl OpenRun {
    fn new(start: usize) -> Self {
        Self {
            start,
            properties_start: None,
            properties: None,
            in_properties: false,
            properties_depth: 0,
            in_text: false,
            text: String::new(),
            style: RunStyle::default(),
        }
    }
}

struct StoryBuilder<'a> {
    names: &'a WordNames,
    part_name: &'a str,
    story: Story,
    containers: Vec<Container>,
    paragraph: Option<OpenParagraph>,
    run: Option<OpenRun>,
    spans: Vec<ParagraphSpan>,
    section: Option<SectionReferences>,
    sections: Vec<SectionReferences>,
}

impl<'a> StoryBuilder<'a> {
    fn new(names: &'a WordNames, part_name: &'a str) -> Self {
        Self {
            names,
            part_name,
            story: Story::new(),
            containers: Vec::new(),
            paragraph: None,
            run: None,
            spans: Vec::new(),
            section: None,
            sections: Vec::new(),
        }
    }

    fn handle(&mut self, index: usize, event: &Event<'static>) -> DocxResult<()> {
        match event {
            Event::Start(e) => self.start(index, e),
            Event::Empty(e) => {
                self.start(index, e)?;
                self.end(index, e.name().as_ref())
            }
            Event::End(e) => self.end(index, e.name().as_ref()),
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| DocxError::xml(self.part_name, e))?;
                if let Some(run) = self.text_target() {
                    run.text.push_str(&text);
                }
                Ok(())
            }
            Event::CData(c) => {
                if let Some(run) = self.text_target() {
                    run.text.push_str(&String::from_utf8_lossy(c));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The run collecting character data right now, if any
    fn text_target(&mut self) -> Option<&mut OpenRun> {
        let nested = self.paragraph.as_ref().map_or(0, |p| p.nested);
        match self.run.as_mut() {
            Some(run) if run.in_text && nested == 0 => Some(run),
            _ => None,
        }
    }

    fn start(&mut self, index: usize, e: &BytesStart<'static>) -> DocxResult<()> {
        let qname = e.name();
        let Some(local) = self.names.local(qname.as_ref()) else {
            return Ok(());
        };

        if let Some(open) = self.paragraph.as_mut() {
            if local == b"p" {
                open.nested += 1;
                return Ok(());
            }
            if open.nested > 0 {
                return Ok(());
            }
        }

        if self.section.is_some() || local == b"sectPr" {
            self.section_element(local, e);
            return Ok(());
        }

        if self.paragraph.is_none() {
            match local {
                b"p" => {
                    let paragraph = Paragraph::new();
                    self.paragraph = Some(OpenParagraph {
                        span: ParagraphSpan {
                            id: paragraph.id(),
                            start: index,
                            end: index,
                            properties: None,
                            runs: Vec::new(),
                        },
                        paragraph,
                        properties_start: None,
                        properties_depth: 0,
                        nested: 0,
                    });
                }
                b"tbl" => self.containers.push(Container::Table(Table::new())),
                b"tr" => self.containers.push(Container::Row(TableRow::new())),
                b"tc" => self.containers.push(Container::Cell(TableCell::new())),
                _ => {}
            }
            return Ok(());
        }
        let Some(open) = self.paragraph.as_mut() else {
            return Ok(());
        };

        if let Some(run) = self.run.as_mut() {
            if run.in_properties {
                if local == b"rPr" {
                    run.properties_depth += 1;
                } else if run.properties_depth == 0 {
                    apply_run_property(&mut run.style, local, e);
                }
                return Ok(());
            }
            match local {
                b"rPr" => {
                    run.in_properties = true;
                    run.properties_start = Some(index);
                }
                b"t" => run.in_text = true,
                b"tab" => run.text.push('\t'),
                // Page and column breaks are layout, not text
                b"br" => {
                    let kind = XmlParser::get_local_attribute(e, "type");
                    if matches!(kind.as_deref(), None | Some("textWrapping")) {
                        run.text.push('\n');
                    }
                }
                b"cr" => run.text.push('\n'),
                _ => {}
            }
            return Ok(());
        }

        match local {
            b"pPr" if open.span.properties.is_none() => match open.properties_start {
                Some(_) => open.properties_depth += 1,
                None => open.properties_start = Some(index),
            },
            b"pStyle"
                if open.properties_start.is_some()
                    && open.properties_depth == 0
                    && open.span.properties.is_none() =>
            {
                open.paragraph.style_id = XmlParser::get_local_attribute(e, "val");
            }
            b"r" if open.properties_start.is_none() || open.span.properties.is_some() => {
                self.run = Some(OpenRun::new(index));
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, index: usize, name: &[u8]) -> DocxResult<()> {
        let Some(local) = self.names.local(name) else {
            return Ok(());
        };

        if let Some(open) = self.paragraph.as_mut() {
            if local == b"p" {
                if open.nested > 0 {
                    open.nested -= 1;
                } else {
                    self.close_paragraph(index);
                }
                return Ok(());
            }
            if open.nested > 0 {
                return Ok(());
            }
        }

        if local == b"sectPr" {
            if let Some(section) = self.section.take() {
                self.sections.push(section);
            }
            return Ok(());
        }
        if self.section.is_some() {
            return Ok(());
        }

        if self.paragraph.is_none() {
            return self.close_container(local);
        }
        let Some(open) = self.paragraph.as_mut() else {
            return Ok(());
        };

        if let Some(run) = self.run.as_mut() {
            if run.in_properties {
                if local == b"rPr" {
                    if run.properties_depth > 0 {
                        run.properties_depth -= 1;
                    } else {
                        run.in_properties = false;
                        run.properties = run.properties_start.map(|start| (start, index));
                    }
                }
                return Ok(());
            }
            match local {
                b"t" => run.in_text = false,
                b"r" => {
                    if let Some(run) = self.run.take() {
                        let model = Run::with_style(run.text.clone(), run.style);
                        open.span.runs.push(RunSpan {
                            id: model.id(),
                            start: run.start,
                            end: index,
                            properties: run.properties,
                            text: run.text,
                        });
                        open.paragraph.add_run(model);
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        if local == b"pPr" && open.span.properties.is_none() {
            if open.properties_depth > 0 {
                open.properties_depth -= 1;
            } else {
                open.span.properties = open.properties_start.map(|start| (start, index));
            }
        }
        Ok(())
    }

    fn section_element(&mut self, local: &[u8], e: &BytesStart<'static>) {
        if local == b"sectPr" {
            self.section = Some(SectionReferences::default());
            return;
        }
        let Some(section) = self.section.as_mut() else {
            return;
        };
        let target = match local {
            b"headerReference" => &mut section.headers,
            b"footerReference" => &mut section.footers,
            _ => return,
        };
        let kind = XmlParser::get_local_attribute(e, "type")
            .and_then(|t| HeaderFooterKind::from_ooxml(&t))
            .unwrap_or(HeaderFooterKind::Default);
        if let Some(rel_id) = XmlParser::get_local_attribute(e, "id") {
            target.push((kind, rel_id));
        }
    }

    fn close_paragraph(&mut self, index: usize) {
        let Some(mut open) = self.paragraph.take() else {
            return;
        };
        self.run = None;
        open.span.end = index;
        self.spans.push(open.span);
        match self.containers.last_mut() {
            Some(Container::Cell(cell)) => {
                cell.add_paragraph(open.paragraph);
            }
            _ => {
                self.story.add_paragraph(open.paragraph);
            }
        }
    }

    fn close_container(&mut self, local: &[u8]) -> DocxResult<()> {
        match local {
            b"tbl" => match self.containers.pop() {
                Some(Container::Table(table)) => {
                    match self.containers.last_mut() {
                        Some(Container::Cell(cell)) => {
                            cell.add_table(table);
                        }
                        _ => {
                            self.story.add_table(table);
                        }
                    }
                    Ok(())
                }
                _ => Err(malformed(self.part_name, "table end without table")),
            },
            b"tr" => match (self.containers.pop(), self.containers.last_mut()) {
                (Some(Container::Row(row)), Some(Container::Table(table))) => {
                    table.add_row(row);
                    Ok(())
                }
                _ => Err(malformed(self.part_name, "table row outside a table")),
            },
            b"tc" => match (self.containers.pop(), self.containers.last_mut()) {
                (Some(Container::Cell(cell)), Some(Container::Row(row))) => {
                    row.add_cell(cell);
                    Ok(())
                }
                _ => Err(malformed(self.part_name, "table cell outside a row")),
            },
            _ => Ok(()),
        }
    }

    fn finish(self) -> DocxResult<(Story, Vec<ParagraphSpan>, Vec<SectionReferences>)> {
        if self.paragraph.is_some() || !self.containers.is_empty() {
            return Err(malformed(self.part_name, "unterminated paragraph or table"));
        }
        Ok((self.story, self.spans, self.sections))
    }
}

fn malformed(part_name: &str, message: &str) -> DocxError {
    DocxError::InvalidStructure(format!("{}: {}", part_name, message))
}

fn on_off(e: &BytesStart) -> bool {
    XmlParser::get_local_attribute(e, "val")
        .map(|v| XmlParser::parse_bool(&v))
        .unwrap_or(true)
}

fn apply_run_property(style: &mut RunStyle, local: &[u8], e: &BytesStart) {
    match local {
        b"rStyle" => style.style_id = XmlParser::get_local_attribute(e, "val"),
        b"b" => style.bold = Some(on_off(e)),
        b"i" => style.italic = Some(on_off(e)),
        b"u" => {
            let value = XmlParser::get_local_attribute(e, "val");
            style.underline = Some(value.map_or(true, |v| v != "none"));
        }
        b"rFonts" => {
            style.font_family = XmlParser::get_local_attribute(e, "ascii")
                .or_else(|| XmlParser::get_local_attribute(e, "hAnsi"));
        }
        b"sz" => {
            style.font_size = XmlParser::get_local_attribute(e, "val")
                .and_then(|v| XmlParser::parse_half_points(&v));
        }
        b"color" => {
            style.color = XmlParser::get_local_attribute(e, "val").filter(|v| v != "auto");
        }
        _ => {}
    }
}
