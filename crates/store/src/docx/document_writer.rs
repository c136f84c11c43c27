//! Text part writer
//!
//! Re-emits a part from its source events. Paragraphs whose runs still match
//! what was read are copied event for event; changed paragraphs keep their
//! start tag and `pPr`, and get their runs rebuilt from the model.

use crate::docx::error::DocxResult;
use crate::docx::part::{ParagraphSpan, PartXml};
use crate::docx::reader::WordNames;
use doc_model::{NodeId, Paragraph, RunStyle};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;

/// Writer for one text part
pub struct PartWriter<'a> {
    part: &'a PartXml,
    writer: Writer<Vec<u8>>,
}

impl<'a> PartWriter<'a> {
    pub fn new(part: &'a PartXml) -> Self {
        Self {
            part,
            writer: Writer::new(Vec::new()),
        }
    }

    /// Serialize the part, taking paragraph content from `paragraphs`.
    ///
    /// Paragraphs absent from the map are written as read.
    pub fn write(mut self, paragraphs: &HashMap<NodeId, &Paragraph>) -> DocxResult<Vec<u8>> {
        let part = self.part;
        let events = &part.events;
        let mut spans = part.paragraphs.iter().peekable();
        let mut index = 0;

        while index < events.len() {
            if let Some(span) = spans.next_if(|s| s.start == index) {
                match paragraphs.get(&span.id) {
                    Some(paragraph) if !span.is_pristine(paragraph) => {
                        self.write_paragraph(span, paragraph)?;
                    }
                    _ => self.copy(span.start, span.end)?,
                }
                index = span.end + 1;
                continue;
            }
            self.writer.write_event(events[index].borrow())?;
            index += 1;
        }

        Ok(self.writer.into_inner())
    }

    fn copy(&mut self, start: usize, end: usize) -> DocxResult<()> {
        for event in &self.part.events[start..=end] {
            self.writer.write_event(event.borrow())?;
        }
        Ok(())
    }

    fn write_paragraph(&mut self, span: &ParagraphSpan, paragraph: &Paragraph) -> DocxResult<()> {
        let part = self.part;
        let names = &part.names;
        match &part.events[span.start] {
            Event::Empty(start) => self.writer.write_event(Event::Start(start.borrow()))?,
            other => self.writer.write_event(other.borrow())?,
        }
        if let Some((start, end)) = span.properties {
            self.copy(start, end)?;
        }

        for run in paragraph.runs() {
            match span.runs.iter().find(|source| source.id == run.id()) {
                Some(source) if source.text == run.text => self.copy(source.start, source.end)?,
                Some(source) => {
                    self.writer.write_event(Event::Start(BytesStart::new(names.qualify("r"))))?;
                    if let Some((start, end)) = source.properties {
                        self.copy(start, end)?;
                    }
                    write_text(&mut self.writer, names, &run.text)?;
                    self.writer.write_event(Event::End(BytesEnd::new(names.qualify("r"))))?;
                }
                None => {
                    self.writer.write_event(Event::Start(BytesStart::new(names.qualify("r"))))?;
                    if !run.style.is_empty() {
                        write_run_properties(&mut self.writer, names, &run.style)?;
                    }
                    write_text(&mut self.writer, names, &run.text)?;
                    self.writer.write_event(Event::End(BytesEnd::new(names.qualify("r"))))?;
                }
            }
        }

        self.writer.write_event(Event::End(BytesEnd::new(names.qualify("p"))))?;
        Ok(())
    }
}

/// Write run text as `w:t` segments, turning `\t` into `w:tab` and `\n` into `w:br`
fn write_text(writer: &mut Writer<Vec<u8>>, names: &WordNames, text: &str) -> DocxResult<()> {
    let mut segment = String::new();
    for ch in text.chars() {
        let break_element = match ch {
            '\t' => "tab",
            '\n' => "br",
            '\r' => continue,
            _ => {
                segment.push(ch);
                continue;
            }
        };
        flush_segment(writer, names, &mut segment)?;
        writer.write_event(Event::Empty(BytesStart::new(names.qualify(break_element))))?;
    }
    flush_segment(writer, names, &mut segment)
}

fn flush_segment(writer: &mut Writer<Vec<u8>>, names: &WordNames, segment: &mut String) -> DocxResult<()> {
    if segment.is_empty() {
        return Ok(());
    }
    let name = names.qualify("t");
    let mut start = BytesStart::new(name.as_str());
    start.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(segment)))?;
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    segment.clear();
    Ok(())
}

/// `w:rPr` for a new run, children in schema order
fn write_run_properties(writer: &mut Writer<Vec<u8>>, names: &WordNames, style: &RunStyle) -> DocxResult<()> {
    let val = names.qualify("val");
    let empty = |local: &str, attributes: &[(&str, &str)]| {
        let mut element = BytesStart::new(names.qualify(local));
        for (key, value) in attributes {
            element.push_attribute((*key, *value));
        }
        Event::Empty(element)
    };
    let toggle = |on: bool| if on { "1" } else { "0" };

    writer.write_event(Event::Start(BytesStart::new(names.qualify("rPr"))))?;
    if let Some(style_id) = &style.style_id {
        writer.write_event(empty("rStyle", &[(val.as_str(), style_id.as_str())]))?;
    }
    if let Some(font) = &style.font_family {
        let ascii = names.qualify("ascii");
        let h_ansi = names.qualify("hAnsi");
        let cs = names.qualify("cs");
        writer.write_event(empty(
            "rFonts",
            &[(ascii.as_str(), font.as_str()), (h_ansi.as_str(), font.as_str()), (cs.as_str(), font.as_str())],
        ))?;
    }
    if let Some(bold) = style.bold {
        writer.write_event(empty("b", &[(val.as_str(), toggle(bold))]))?;
    }
    if let Some(italic) = style.italic {
        writer.write_event(empty("i", &[(val.as_str(), toggle(italic))]))?;
    }
    if let Some(color) = &style.color {
        writer.write_event(empty("color", &[(val.as_str(), color.as_str())]))?;
    }
    if let Some(size) = style.font_size {
        let half_points = (size * 2.0).round().to_string();
        writer.write_event(empty("sz", &[(val.as_str(), half_points.as_str())]))?;
    }
    if let Some(underline) = style.underline {
        writer.write_event(empty("u", &[(val.as_str(), if underline { "single" } else { "none" })]))?;
    }
    writer.write_event(Event::End(BytesEnd::new(names.qualify("rPr"))))?;
    Ok(())
}
