//! DOCX package writer
//!
//! Writes a [`Package`] back to a ZIP archive in its original entry order,
//! substituting the parts that were rewritten.

use crate::docx::error::DocxResult;
use crate::docx::package::Package;
use std::collections::HashMap;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package writer
pub struct DocxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> DocxWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Write every entry of `package`, using `overrides` for replaced parts
    pub fn write(mut self, package: &Package, overrides: &HashMap<String, Vec<u8>>) -> DocxResult<W> {
        for entry in package.entries() {
            let options = SimpleFileOptions::default().compression_method(writable(entry.compression));
            if entry.is_dir {
                self.zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            let data = overrides.get(&entry.name).unwrap_or(&entry.data);
            self.zip.start_file(entry.name.as_str(), options)?;
            self.zip.write_all(data)?;
        }
        Ok(self.zip.finish()?)
    }
}

/// Entries stored uncompressed stay that way; everything else is deflated
fn writable(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::DocxReader;
    use std::io::Cursor;

    fn sample_package() -> Package {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("[Content_Types].xml", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<Types/>").unwrap();
            zip.start_file("_rels/.rels", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"<Relationships/>").unwrap();
            zip.start_file("word/media/image1.png", stored).unwrap();
            zip.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
            zip.finish().unwrap();
        }
        cursor.set_position(0);
        DocxReader::new(cursor).unwrap().read_package().unwrap()
    }

    #[test]
    fn test_rewrite_preserves_order_content_and_compression() {
        let package = sample_package();
        let mut overrides = HashMap::new();
        overrides.insert("_rels/.rels".to_string(), b"<Relationships></Relationships>".to_vec());

        let cursor = DocxWriter::new(Cursor::new(Vec::new()))
            .write(&package, &overrides)
            .unwrap();
        let mut reread_cursor = cursor;
        reread_cursor.set_position(0);
        let reread = DocxReader::new(reread_cursor).unwrap().read_package().unwrap();

        let names: Vec<&str> = reread.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["[Content_Types].xml", "_rels/.rels", "word/media/image1.png"]);
        assert_eq!(reread.get("_rels/.rels"), Some(&b"<Relationships></Relationships>"[..]));
        assert_eq!(reread.get("word/media/image1.png"), package.get("word/media/image1.png"));
        assert_eq!(
            reread.entry("word/media/image1.png").map(|e| e.compression),
            Some(CompressionMethod::Stored)
        );
    }

    #[test]
    fn test_reader_rejects_non_packages() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            zip.start_file("notes.txt", SimpleFileOptions::default()).unwrap();
            zip.write_all(b"hello").unwrap();
            zip.finish().unwrap();
        }
        cursor.set_position(0);
        assert!(DocxReader::new(cursor).unwrap().read_package().is_err());
    }
}
