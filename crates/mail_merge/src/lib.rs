//! Mail Merge - row sources and placeholder substitution
//!
//! This crate turns spreadsheet rows into filled-in copies of `.docx`
//! templates.
//!
//! # Features
//!
//! - CSV and XLSX/XLS row sources; the first column identifies the client
//! - Placeholder mappings with derived date, first-name and alias keys
//! - Substitution of `${key}`, `$<key>`, `<key>` and `« key»` placeholders
//!   in body, table, header and footer paragraphs
//! - Merge runs with per-row template selection and pluggable output sinks
//! - CSV/JSON link reports
//!
//! # Example
//!
//! ```rust
//! use doc_model::{Document, Paragraph, Run, RegionSet};
//! use mail_merge::{substitute, PlaceholderMapping};
//!
//! let mut document = Document::new();
//! document.add_paragraph(Paragraph::from_runs(vec![Run::new("NIT <NI"), Run::new("T>")]));
//!
//! let mut mapping = PlaceholderMapping::new();
//! mapping.insert("NIT", "900123456");
//!
//! let report = substitute(&mut document, &mapping);
//! assert_eq!(document.plain_text(RegionSet::all()), "NIT 900123456");
//! assert_eq!(report.replacements, 1);
//! ```

mod csv_parser;
mod data_source;
mod error;
mod mapping;
mod output;
mod placeholder;
mod report;
mod xlsx_parser;
pub mod merge_engine;
pub mod substitute;

// Re-export main types
pub use csv_parser::{detect_delimiter, CsvConfig, CsvParser};
pub use data_source::{ColumnDef, DataSource, DataSourceType, DataType, Record, Value};
pub use error::{MailMergeError, Result};
pub use mapping::{DateFields, FieldAlias, MappingBuilder, PlaceholderMapping};
pub use merge_engine::{
    sanitize_file_component, MergeEngine, MergeError, MergeOptions, MergeProgress, MergeResult, MergeStatus,
    MergedRecord, RecordRange, TemplateCatalog, TemplateSelector,
};
pub use output::{DirectorySink, GeneratedDocument, MemorySink, OutputLocation, OutputSink};
pub use placeholder::{PatternSet, PlaceholderSyntax};
pub use report::{LinkRecord, LinkReport};
pub use substitute::{substitute, SubstitutionOptions, SubstitutionReport, Substituter};
pub use xlsx_parser::{get_sheet_names, SheetSelector, XlsxConfig, XlsxParser};

use std::path::Path;

/// Load a row source from a file, choosing the parser by extension
pub fn load_from_file(path: impl AsRef<Path>) -> Result<DataSource> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => CsvParser::new().parse_file(path),
        "tsv" => CsvParser::with_config(CsvConfig::tab()).parse_file(path),
        "xlsx" | "xlsm" | "xls" => XlsxParser::new().parse_file(path),
        _ => Err(MailMergeError::UnsupportedFormat(format!(
            "Unknown file extension for: {}",
            path.display()
        ))),
    }
}

/// Create an inline data source from records
pub fn create_inline_source(id: &str, columns: Vec<(&str, DataType)>, records: Vec<Vec<(&str, Value)>>) -> DataSource {
    let mut ds = DataSource::inline(id);

    for (name, data_type) in columns {
        ds.add_column(ColumnDef::new(name, data_type));
    }

    for record_data in records {
        let mut record = Record::new();
        for (key, value) in record_data {
            record.insert(key.to_string(), value);
        }
        ds.add_record(record);
    }

    ds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_csv_file() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "NIT;Nombres y Apellidos").unwrap();
        writeln!(file, "900123456;Ana Pérez").unwrap();
        writeln!(file, "800555111;Luis Gómez").unwrap();

        let ds = load_from_file(file.path()).unwrap();
        assert_eq!(ds.record_count(), 2);
        assert!(ds.has_column("Nombres y Apellidos"));
    }

    #[test]
    fn test_load_tsv_file() {
        let mut file = NamedTempFile::with_suffix(".TSV").unwrap();
        writeln!(file, "NIT\tCiudad").unwrap();
        writeln!(file, "900123456\tBogotá").unwrap();

        let ds = load_from_file(file.path()).unwrap();
        assert_eq!(ds.record_count(), 1);
        assert!(ds.has_column("Ciudad"));
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_from_file("/path/to/clientes.json");
        assert!(matches!(result, Err(MailMergeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_create_inline_source() {
        let ds = create_inline_source(
            "clientes",
            vec![("NIT", DataType::Text), ("Valor", DataType::Number)],
            vec![
                vec![("NIT", Value::from("0012")), ("Valor", Value::Number(30.0))],
                vec![("NIT", Value::from("0099")), ("Valor", Value::Number(25.5))],
            ],
        );

        assert_eq!(ds.record_count(), 2);
        assert_eq!(ds.client_id(0).as_deref(), Some("0012"));
        assert_eq!(ds.get_value(1, "Valor").unwrap().to_string_value(), "25.5");
    }
}
