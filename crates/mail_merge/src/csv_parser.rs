//! CSV parser for row sources exported from spreadsheets

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::data_source::{ColumnDef, DataSource, DataSourceType, DataType, Record, Value};
use crate::error::{MailMergeError, Result};

/// CSV parser configuration
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Delimiter character; `None` detects it from the header line
    pub delimiter: Option<char>,
    /// Whether the first row contains headers
    pub has_header: bool,
    /// Whether to trim whitespace from values
    pub trim_whitespace: bool,
    /// Whether to auto-detect data types
    pub auto_detect_types: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            trim_whitespace: true,
            auto_detect_types: true,
        }
    }
}

impl CsvConfig {
    /// Comma separated values
    pub fn comma() -> Self {
        Self::default().with_delimiter(',')
    }

    /// Semicolon separated values, as written by spreadsheets in es-CO locales
    pub fn semicolon() -> Self {
        Self::default().with_delimiter(';')
    }

    /// Tab separated values
    pub fn tab() -> Self {
        Self::default().with_delimiter('\t')
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether the first row is a header
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    /// Set whether to auto-detect types
    pub fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect_types = auto_detect;
        self
    }
}

/// CSV parser for creating data sources from CSV files or strings
pub struct CsvParser {
    config: CsvConfig,
}

impl CsvParser {
    /// Create a new CSV parser with default configuration
    pub fn new() -> Self {
        Self {
            config: CsvConfig::default(),
        }
    }

    /// Create a new CSV parser with custom configuration
    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Parse a CSV file and return a DataSource
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DataSource> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }

        let mut content = String::new();
        std::fs::File::open(path)?.read_to_string(&mut content)?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv_source")
            .to_string();

        let delimiter = self.delimiter_for(&content);
        let source_type = DataSourceType::Csv {
            path: path.display().to_string(),
            delimiter,
        };

        self.parse_content(&content, delimiter, id, source_type)
    }

    /// Parse CSV from a string and return a DataSource
    pub fn parse_string(&self, data: &str, id: impl Into<String>) -> Result<DataSource> {
        let delimiter = self.delimiter_for(data);
        self.parse_content(data, delimiter, id.into(), DataSourceType::Inline)
    }

    fn delimiter_for(&self, content: &str) -> char {
        self.config
            .delimiter
            .unwrap_or_else(|| detect_delimiter(strip_bom(content)))
    }

    fn parse_content(
        &self,
        content: &str,
        delimiter: char,
        id: String,
        source_type: DataSourceType,
    ) -> Result<DataSource> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .has_headers(self.config.has_header)
            .trim(if self.config.trim_whitespace {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(true)
            .from_reader(strip_bom(content).as_bytes());

        let headers: Vec<String> = if self.config.has_header {
            csv_reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(MailMergeError::DuplicateColumn(header.clone()));
            }
        }

        let mut raw_records: Vec<csv::StringRecord> = Vec::new();
        for result in csv_reader.records() {
            raw_records.push(result?);
        }

        if raw_records.is_empty() && headers.is_empty() {
            return Err(MailMergeError::EmptyDataSource("CSV file is empty".to_string()));
        }

        let headers: Vec<String> = if headers.is_empty() {
            let width = raw_records.first().map(|r| r.len()).unwrap_or(0);
            (0..width).map(|i| format!("Column{}", i + 1)).collect()
        } else {
            headers
        };

        let rows: Vec<Vec<Value>> = raw_records
            .iter()
            .map(|raw| {
                raw.iter()
                    .take(headers.len())
                    .map(|field| {
                        if self.config.auto_detect_types {
                            Value::parse_auto(field)
                        } else if field.is_empty() {
                            Value::Null
                        } else {
                            Value::Text(field.to_string())
                        }
                    })
                    .collect()
            })
            .collect();

        let mut data_source = DataSource::new(id, source_type);
        for (i, header) in headers.iter().enumerate() {
            let data_type = DataType::detect(rows.iter().filter_map(|row| row.get(i)));
            data_source.add_column(ColumnDef::new(header.clone(), data_type));
        }

        for row in rows {
            let record: Record = headers.iter().cloned().zip(row).collect();
            data_source.add_record(record);
        }

        Ok(data_source)
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Detect the delimiter used in a CSV file from its first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let delimiters = [',', ';', '\t', '|'];
    let mut best_delimiter = ',';
    let mut best_count = 0;

    for &delim in &delimiters {
        let count = first_line.matches(delim).count();
        if count > best_count {
            best_count = count;
            best_delimiter = delim;
        }
    }

    best_delimiter
}
