//! Merge Execution Engine
//!
//! Runs a document kind over a row source: for every selected row it picks
//! a template, builds the row's mapping, substitutes it into a fresh copy of
//! the template and hands the result to an [`OutputSink`].

use crate::data_source::DataSource;
use crate::error::{MailMergeError, Result};
use crate::mapping::{DateFields, MappingBuilder, PlaceholderMapping};
use crate::output::{GeneratedDocument, OutputLocation, OutputSink};
use crate::substitute::{SubstitutionOptions, SubstitutionReport, Substituter};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use store::{DocxTemplate, KindSettings, MergeSettings};
use tracing::{error, info, warn};

/// Which rows a run processes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordRange {
    #[default]
    All,
    /// Inclusive, 0-based
    Range { start: usize, end: usize },
    Single(usize),
    /// Rows whose `column` equals `value` (both trimmed)
    Filter { column: String, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Kind label used in file names, e.g. `Comunicado`
    pub kind: String,
    /// Folder under the output root, e.g. `Comunicados`
    pub folder: String,
    pub record_range: RecordRange,
    /// Zero means no limit
    pub max_records: usize,
    pub output_name_pattern: String,
    pub substitution: SubstitutionOptions,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            kind: "Documento".to_string(),
            folder: "Documentos".to_string(),
            record_range: RecordRange::All,
            max_records: 0,
            output_name_pattern: "{kind}_{year}_{client_id}.docx".to_string(),
            substitution: SubstitutionOptions::default(),
        }
    }
}

impl MergeOptions {
    pub fn for_kind(kind: &KindSettings) -> Self {
        Self {
            kind: kind.label.clone(),
            folder: kind.folder.clone(),
            output_name_pattern: kind.file_name_pattern.clone(),
            substitution: SubstitutionOptions::for_kind(kind),
            ..Default::default()
        }
    }

    pub fn with_range(mut self, range: RecordRange) -> Self {
        self.record_range = range;
        self
    }

    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    pub fn with_output_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.output_name_pattern = pattern.into();
        self
    }

    pub fn with_substitution(mut self, substitution: SubstitutionOptions) -> Self {
        self.substitution = substitution;
        self
    }
}

/// Templates of one kind, optionally chosen per row by an indicator column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    pub default_template: PathBuf,
    pub selector: Option<TemplateSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSelector {
    pub column: String,
    /// Indicator value to template
    pub templates: BTreeMap<String, PathBuf>,
}

impl TemplateCatalog {
    pub fn single(template: impl Into<PathBuf>) -> Self {
        Self {
            default_template: template.into(),
            selector: None,
        }
    }

    pub fn with_selector(
        mut self,
        column: impl Into<String>,
        templates: BTreeMap<String, PathBuf>,
    ) -> Self {
        self.selector = Some(TemplateSelector {
            column: column.into(),
            templates,
        });
        self
    }

    pub fn from_kind(kind: &KindSettings) -> Self {
        let catalog = Self::single(kind.default_template.clone());
        match &kind.selector {
            Some(selector) => {
                catalog.with_selector(selector.column.clone(), selector.templates.clone())
            }
            None => catalog,
        }
    }

    /// Template for a row. A blank or unknown indicator falls back to the
    /// default template.
    pub fn select(&self, source: &DataSource, record_index: usize) -> &Path {
        let Some(selector) = &self.selector else {
            return &self.default_template;
        };
        let indicator = source
            .get_value(record_index, &selector.column)
            .map(|v| v.to_string_value().trim().to_string())
            .unwrap_or_default();
        if indicator.is_empty() {
            warn!(
                record = record_index,
                column = %selector.column,
                "blank indicator, using default template"
            );
            return &self.default_template;
        }
        match selector.templates.get(&indicator) {
            Some(template) => template,
            None => {
                warn!(
                    record = record_index,
                    column = %selector.column,
                    indicator = %indicator,
                    "unknown indicator, using default template"
                );
                &self.default_template
            }
        }
    }

    /// Every template the catalog can pick
    pub fn templates(&self) -> Vec<&Path> {
        let mut all = vec![self.default_template.as_path()];
        if let Some(selector) = &self.selector {
            for template in selector.templates.values() {
                if !all.contains(&template.as_path()) {
                    all.push(template);
                }
            }
        }
        all
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRecord {
    pub record_index: usize,
    pub client_id: Option<String>,
    pub template: Option<PathBuf>,
    pub mapping: PlaceholderMapping,
    pub substitution: SubstitutionReport,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub output: Option<OutputLocation>,
}

impl MergedRecord {
    fn skipped(record_index: usize, reason: impl Into<String>) -> Self {
        Self {
            record_index,
            client_id: None,
            template: None,
            mapping: PlaceholderMapping::new(),
            substitution: SubstitutionReport::default(),
            skipped: true,
            skip_reason: Some(reason.into()),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResult {
    pub status: MergeStatus,
    pub total_records: usize,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub merged_records: Vec<MergedRecord>,
    pub errors: Vec<MergeError>,
    pub outputs: Vec<OutputLocation>,
    pub summary: String,
}

impl MergeResult {
    pub fn new(total_records: usize) -> Self {
        Self {
            status: MergeStatus::Pending,
            total_records,
            processed_count: 0,
            skipped_count: 0,
            error_count: 0,
            merged_records: Vec::new(),
            errors: Vec::new(),
            outputs: Vec::new(),
            summary: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == MergeStatus::Completed && self.error_count == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed_count == 0 {
            return 0.0;
        }
        ((self.processed_count - self.error_count) as f64 / self.processed_count as f64) * 100.0
    }

    /// Documents actually generated
    pub fn generated_count(&self) -> usize {
        self.outputs.len()
    }

    fn record(&mut self, outcome: std::result::Result<MergedRecord, MergeError>) {
        self.processed_count += 1;
        match outcome {
            Ok(merged) => {
                if merged.skipped {
                    self.skipped_count += 1;
                }
                if let Some(ref output) = merged.output {
                    self.outputs.push(output.clone());
                }
                self.merged_records.push(merged);
            }
            Err(err) => {
                self.error_count += 1;
                self.errors.push(err);
            }
        }
    }

    fn finish(&mut self) {
        let nothing_generated = self.error_count + self.skipped_count == self.processed_count;
        self.status = if self.error_count > 0 && nothing_generated {
            MergeStatus::Failed
        } else {
            MergeStatus::Completed
        };
        self.summary = format!(
            "Processed {} of {} records ({} generated, {} skipped, {} errors)",
            self.processed_count,
            self.total_records,
            self.generated_count(),
            self.skipped_count,
            self.error_count
        );
    }
}

/// A row that failed; the run continues with the next row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeError {
    pub record_index: usize,
    pub client_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeProgress {
    pub current_record: usize,
    pub total_records: usize,
    pub status: MergeStatus,
    pub percent: f64,
}

impl MergeProgress {
    pub fn at(current: usize, total: usize) -> Self {
        let percent = if total > 0 {
            (current as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            current_record: current,
            total_records: total,
            status: MergeStatus::InProgress,
            percent,
        }
    }
}

pub struct MergeEngine {
    data_source: DataSource,
    catalog: TemplateCatalog,
    mapping: MappingBuilder,
    options: MergeOptions,
}

impl MergeEngine {
    pub fn new(
        data_source: DataSource,
        catalog: TemplateCatalog,
        mapping: MappingBuilder,
        options: MergeOptions,
    ) -> Self {
        Self {
            data_source,
            catalog,
            mapping,
            options,
        }
    }

    /// Engine for a kind named in the settings file
    pub fn from_settings(
        data_source: DataSource,
        settings: &MergeSettings,
        kind: &str,
        dates: DateFields,
    ) -> Result<Self> {
        let kind_settings = settings.kind(kind).ok_or_else(|| {
            MailMergeError::InvalidConfig(format!(
                "unknown document kind '{}' (known: {})",
                kind,
                settings.kind_names().join(", ")
            ))
        })?;
        Ok(Self::new(
            data_source,
            TemplateCatalog::from_kind(kind_settings),
            MappingBuilder::from_settings(settings, dates),
            MergeOptions::for_kind(kind_settings),
        ))
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn execute(&self, sink: &mut dyn OutputSink) -> MergeResult {
        self.run(Some(sink), |_| {})
    }

    pub fn execute_with_progress<F>(&self, sink: &mut dyn OutputSink, on_progress: F) -> MergeResult
    where
        F: FnMut(MergeProgress),
    {
        self.run(Some(sink), on_progress)
    }

    /// Build mappings and substitute without delivering anything
    pub fn preview(&self, count: usize) -> MergeResult {
        let preview = Self {
            data_source: self.data_source.clone(),
            catalog: self.catalog.clone(),
            mapping: self.mapping.clone(),
            options: self.options.clone().with_max_records(count),
        };
        let mut result = preview.run(None, |_| {});
        result.summary = format!("Preview: {} records shown", result.processed_count);
        result
    }

    fn run<F>(&self, mut sink: Option<&mut dyn OutputSink>, mut on_progress: F) -> MergeResult
    where
        F: FnMut(MergeProgress),
    {
        let mut indices = self.resolve_record_range();
        if self.options.max_records > 0 {
            indices.truncate(self.options.max_records);
        }
        let total = indices.len();
        let substituter = Substituter::new(self.options.substitution.clone());
        let mut templates: HashMap<PathBuf, Vec<u8>> = HashMap::new();

        let mut result = MergeResult::new(self.data_source.record_count());
        result.status = MergeStatus::InProgress;
        for (i, &record_index) in indices.iter().enumerate() {
            on_progress(MergeProgress::at(i + 1, total));
            let outcome = self.process_record(
                record_index,
                &substituter,
                &mut templates,
                sink.as_deref_mut(),
            );
            if let Err(ref err) = outcome {
                error!(record = record_index, client_id = ?err.client_id, "{}", err.message);
            }
            result.record(outcome);
        }
        result.finish();
        info!(kind = %self.options.kind, "{}", result.summary);
        result
    }

    fn process_record(
        &self,
        record_index: usize,
        substituter: &Substituter,
        templates: &mut HashMap<PathBuf, Vec<u8>>,
        sink: Option<&mut (dyn OutputSink + '_)>,
    ) -> std::result::Result<MergedRecord, MergeError> {
        if self.data_source.get_record(record_index).is_none() {
            return Err(MergeError {
                record_index,
                client_id: None,
                message: format!("Record at index {} not found", record_index),
            });
        }
        let Some(client_id) = self.data_source.client_id(record_index) else {
            warn!(record = record_index, "row has no client identifier, skipping");
            return Ok(MergedRecord::skipped(record_index, "empty client identifier"));
        };
        let fail = |message: String| MergeError {
            record_index,
            client_id: Some(client_id.clone()),
            message,
        };

        let template_path = self
            .catalog
            .select(&self.data_source, record_index)
            .to_path_buf();
        let mut template =
            load_template(templates, &template_path).map_err(|e| fail(e.to_string()))?;

        let mapping = self.mapping.build_for_record(&self.data_source, record_index);
        let substitution = substituter.substitute(template.document_mut(), &mapping);

        let output = match sink {
            Some(sink) => {
                let bytes = template
                    .to_bytes()
                    .map_err(|e| fail(format!("cannot write document: {}", e)))?;
                let folder =
                    Path::new(&self.options.folder).join(sanitize_file_component(&client_id));
                let document = GeneratedDocument {
                    record_index,
                    client_id: client_id.clone(),
                    kind: self.options.kind.clone(),
                    folder,
                    file_name: self.resolve_output_name(&client_id, record_index, &mapping),
                    bytes,
                };
                let location = sink.deliver(&document).map_err(|e| fail(e.to_string()))?;
                info!(
                    client_id = %client_id,
                    path = %location.path.display(),
                    "generated document"
                );
                Some(location)
            }
            None => None,
        };

        Ok(MergedRecord {
            record_index,
            client_id: Some(client_id),
            template: Some(template_path),
            mapping,
            substitution,
            skipped: false,
            skip_reason: None,
            output,
        })
    }

    fn resolve_record_range(&self) -> Vec<usize> {
        let total = self.data_source.record_count();
        match &self.options.record_range {
            RecordRange::All => (0..total).collect(),
            RecordRange::Range { start, end } => {
                let start = (*start).min(total);
                let end = end.saturating_add(1).min(total);
                (start..end).collect()
            }
            RecordRange::Single(idx) => {
                if *idx < total {
                    vec![*idx]
                } else {
                    Vec::new()
                }
            }
            RecordRange::Filter { column, value } => (0..total)
                .filter(|&i| {
                    self.data_source
                        .get_value(i, column)
                        .map(|v| v.to_string_value().trim() == value.trim())
                        .unwrap_or(false)
                })
                .collect(),
        }
    }

    /// File name for a row: `{kind}`, `{year}`, `{client_id}`, `{index}`
    /// (1-based) and `{<key>}` for any mapping key
    pub fn resolve_output_name(
        &self,
        client_id: &str,
        record_index: usize,
        mapping: &PlaceholderMapping,
    ) -> String {
        let mut name = self.options.output_name_pattern.clone();
        let year = self.mapping.dates().date().year().to_string();
        let builtins = [
            ("kind", self.options.kind.as_str()),
            ("year", year.as_str()),
            ("client_id", client_id),
        ];
        for (field, value) in builtins {
            name = name.replace(&format!("{{{}}}", field), &sanitize_file_component(value));
        }
        name = name.replace("{index}", &(record_index + 1).to_string());
        for (field, value) in mapping.iter() {
            name = name.replace(&format!("{{{}}}", field), &sanitize_file_component(value));
        }
        name
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }
}

fn load_template(cache: &mut HashMap<PathBuf, Vec<u8>>, path: &Path) -> Result<DocxTemplate> {
    if !cache.contains_key(path) {
        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }
        cache.insert(path.to_path_buf(), std::fs::read(path)?);
    }
    match cache.get(path) {
        Some(bytes) => Ok(DocxTemplate::from_bytes(bytes)?),
        None => Err(MailMergeError::FileNotFound(path.display().to_string())),
    }
}

/// Keep letters, digits, `-` and `_`; everything else becomes `_`
pub fn sanitize_file_component(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{ColumnDef, DataType, Record, Value};
    use crate::output::MemorySink;
    use chrono::NaiveDate;
    use std::io::Write;

    fn sample_data_source() -> DataSource {
        let mut ds = DataSource::inline("clientes");
        ds.add_column(ColumnDef::new("NIT", DataType::Text));
        ds.add_column(ColumnDef::new("Nombres y Apellidos", DataType::Text));
        ds.add_column(ColumnDef::new("Indicador Tarifa", DataType::Number));
        let rows = [
            ("900123456", "Ana Pérez", Value::Number(1.0)),
            ("800555111", "Luis Gómez", Value::Number(2.0)),
            ("", "Sin NIT", Value::Null),
            ("700999000", "Eva Ríos", Value::Text("7".into())),
        ];
        for (nit, name, indicator) in rows {
            let mut record = Record::new();
            record.insert("NIT".into(), Value::parse_auto(nit));
            record.insert("Nombres y Apellidos".into(), name.into());
            record.insert("Indicador Tarifa".into(), indicator);
            ds.add_record(record);
        }
        ds
    }

    fn dates() -> DateFields {
        DateFields::new(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
    }

    fn catalog() -> TemplateCatalog {
        let mut templates = BTreeMap::new();
        templates.insert("1".to_string(), PathBuf::from("uno.docx"));
        templates.insert("2".to_string(), PathBuf::from("dos.docx"));
        TemplateCatalog::single("uno.docx").with_selector("Indicador Tarifa", templates)
    }

    fn engine(options: MergeOptions) -> MergeEngine {
        MergeEngine::new(sample_data_source(), catalog(), MappingBuilder::new(dates()), options)
    }

    /// Smallest package the loader accepts: one body paragraph
    fn write_template(path: &Path, text: &str) {
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#
                    .to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "word/document.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
                    text.replace('<', "&lt;").replace('>', "&gt;")
                ),
            ),
        ];
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, content) in parts {
            zip.start_file(name, zip::write::SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_template_selection_by_indicator() {
        let ds = sample_data_source();
        let catalog = catalog();
        assert_eq!(catalog.select(&ds, 0), Path::new("uno.docx"));
        assert_eq!(catalog.select(&ds, 1), Path::new("dos.docx"));
        assert_eq!(catalog.select(&ds, 2), Path::new("uno.docx"));
        assert_eq!(catalog.select(&ds, 3), Path::new("uno.docx"));
        assert_eq!(catalog.templates().len(), 2);
    }

    #[test]
    fn test_catalog_from_kind_settings() {
        let catalog = TemplateCatalog::from_kind(&KindSettings::renovacion());
        assert_eq!(catalog.selector.as_ref().unwrap().column, "Indicador Tarifa");
        assert!(TemplateCatalog::from_kind(&KindSettings::comunicado())
            .selector
            .is_none());
    }

    #[test]
    fn test_output_name() {
        let e = engine(MergeOptions {
            kind: "Comunicado".into(),
            ..Default::default()
        });
        let mapping = e.mapping.build_for_record(e.data_source(), 0);
        assert_eq!(
            e.resolve_output_name("900123456", 0, &mapping),
            "Comunicado_2025_900123456.docx"
        );

        let pattern = "{index}-{Nombres y Apellidos}-{Mes}.docx";
        let e = e.with_options(MergeOptions::default().with_output_pattern(pattern));
        assert_eq!(
            e.resolve_output_name("900123456", 0, &mapping),
            "1-Ana_Pérez-marzo.docx"
        );
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("900.123/456"), "900_123_456");
        assert_eq!(sanitize_file_component("Razón-Social_1"), "Razón-Social_1");
    }

    #[test]
    fn test_missing_templates_fail_rows_not_run() {
        let r = engine(MergeOptions::default()).execute(&mut MemorySink::new());
        assert_eq!(r.processed_count, 4);
        assert_eq!(r.skipped_count, 1);
        assert_eq!(r.error_count, 3);
        assert_eq!(r.status, MergeStatus::Failed);
        assert_eq!(r.errors[0].client_id.as_deref(), Some("900123456"));
    }

    #[test]
    fn test_one_sink_receives_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("carta.docx");
        write_template(&template, "Hola <Nombre>");
        let e = MergeEngine::new(
            sample_data_source(),
            TemplateCatalog::single(template.clone()),
            MappingBuilder::new(dates()),
            MergeOptions::default(),
        );

        let mut sink = MemorySink::new();
        let result = e.execute(&mut sink);

        assert_eq!(result.status, MergeStatus::Completed);
        assert_eq!(result.generated_count(), 3);
        let clients: Vec<&str> = sink.documents.iter().map(|d| d.client_id.as_str()).collect();
        assert_eq!(clients, vec!["900123456", "800555111", "700999000"]);
        assert_eq!(result.merged_records[0].substitution.replacements, 1);
    }

    #[test]
    fn test_record_ranges() {
        let range = |r: RecordRange| {
            engine(MergeOptions::default().with_range(r)).resolve_record_range()
        };
        assert_eq!(range(RecordRange::Range { start: 1, end: 2 }), vec![1, 2]);
        assert_eq!(range(RecordRange::Single(3)), vec![3]);
        assert!(range(RecordRange::Single(9)).is_empty());
        let filter = RecordRange::Filter {
            column: "Indicador Tarifa".into(),
            value: "2".into(),
        };
        assert_eq!(range(filter), vec![1]);
    }

    #[test]
    fn test_unknown_kind() {
        let result = MergeEngine::from_settings(
            sample_data_source(),
            &MergeSettings::default(),
            "circular",
            dates(),
        );
        assert!(matches!(result, Err(MailMergeError::InvalidConfig(_))));
    }

    #[test]
    fn test_merge_success_rate() {
        let mut r = MergeResult::new(10);
        r.processed_count = 10;
        r.error_count = 2;
        assert!((r.success_rate() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_merge_status_serialization() {
        assert_eq!(
            serde_json::to_string(&MergeStatus::Completed).unwrap(),
            "\"completed\""
        );
    }

    #[test]
    fn test_empty_data_source_merge() {
        let e = MergeEngine::new(
            DataSource::inline("vacio"),
            catalog(),
            MappingBuilder::new(dates()),
            MergeOptions::default(),
        );
        let r = e.execute(&mut MemorySink::new());
        assert_eq!(r.processed_count, 0);
        assert_eq!(r.status, MergeStatus::Completed);
    }
}
