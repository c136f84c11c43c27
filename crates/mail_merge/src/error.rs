//! Error types for merge operations

use thiserror::Error;

/// Errors that can occur while reading rows or producing documents
#[derive(Debug, Error)]
pub enum MailMergeError {
    /// IO error reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing CSV data
    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    /// Error writing a JSON report
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing XLSX data
    #[error("XLSX parse error: {0}")]
    XlsxParse(String),

    /// Template could not be loaded or written
    #[error("Template error: {0}")]
    Template(#[from] store::DocxError),

    /// Column not found in data source
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Record not found
    #[error("Record not found at index {0}")]
    RecordNotFound(usize),

    /// Row has no client identifier in its first column
    #[error("Record {0} has no client identifier")]
    MissingClientId(usize),

    /// Empty data source
    #[error("Data source is empty: {0}")]
    EmptyDataSource(String),

    /// Duplicate column names
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Merge configuration is unusable
    #[error("Invalid merge configuration: {0}")]
    InvalidConfig(String),

    /// A generated document could not be delivered
    #[error("Output error: {0}")]
    Output(String),
}

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MailMergeError>;
