//! Link report: where each generated document was published

use crate::error::Result;
use crate::merge_engine::MergeResult;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// One generated document and its links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub client_id: String,
    /// Kind label, e.g. `Comunicado`
    pub kind: String,
    /// Local path of the document
    pub document: String,
    pub document_url: Option<String>,
    pub pdf_url: Option<String>,
}

/// Links for a merge run, written as CSV or JSON.
///
/// The CSV has a `Link_<Kind>` and a `Link_PDF_<Kind>` column per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReport {
    records: Vec<LinkRecord>,
}

impl LinkReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for every document a run generated
    pub fn from_result(kind: &str, result: &MergeResult) -> Self {
        let mut report = Self::new();
        report.extend_from_result(kind, result);
        report
    }

    pub fn extend_from_result(&mut self, kind: &str, result: &MergeResult) {
        for merged in &result.merged_records {
            let (Some(client_id), Some(output)) = (&merged.client_id, &merged.output) else {
                continue;
            };
            self.records.push(LinkRecord {
                client_id: client_id.clone(),
                kind: kind.to_string(),
                document: output.path.display().to_string(),
                document_url: output.url.clone(),
                pdf_url: output.pdf_url.clone(),
            });
        }
    }

    pub fn push(&mut self, record: LinkRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Kinds in order of first appearance
    fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for record in &self.records {
            if !kinds.contains(&record.kind.as_str()) {
                kinds.push(&record.kind);
            }
        }
        kinds
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let kinds = self.kinds();
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["Cliente".to_string(), "Tipo".to_string(), "Documento".to_string()];
        for kind in &kinds {
            header.push(format!("Link_{}", kind));
            header.push(format!("Link_PDF_{}", kind));
        }
        csv_writer.write_record(&header)?;

        for record in &self.records {
            let mut row = vec![record.client_id.clone(), record.kind.clone(), record.document.clone()];
            for kind in &kinds {
                if *kind == record.kind {
                    row.push(record.document_url.clone().unwrap_or_default());
                    row.push(record.pdf_url.clone().unwrap_or_default());
                } else {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Write to `path`: JSON for a `.json` extension, CSV otherwise
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            std::fs::write(path, self.to_json()?)?;
        } else {
            self.write_csv(std::fs::File::create(path)?)?;
        }
        Ok(())
    }
}
