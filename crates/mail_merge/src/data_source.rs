//! Row sources for merges: ordered columns, typed cell values

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rows read from a spreadsheet or CSV export.
///
/// Columns keep their sheet order; the first column holds the client
/// identifier used for output naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// Identifier for this source, usually the file stem
    pub id: String,
    /// Where the rows came from
    pub source_type: DataSourceType,
    /// Column definitions in sheet order
    pub columns: Vec<ColumnDef>,
    /// Data records
    pub records: Vec<Record>,
}

impl DataSource {
    pub fn new(id: impl Into<String>, source_type: DataSourceType) -> Self {
        Self {
            id: id.into(),
            source_type,
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Create an empty in-memory source
    pub fn inline(id: impl Into<String>) -> Self {
        Self::new(id, DataSourceType::Inline)
    }

    pub fn add_column(&mut self, column: ColumnDef) {
        self.columns.push(column);
    }

    pub fn add_record(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in sheet order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get_record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn get_value(&self, record_index: usize, column_name: &str) -> Option<&Value> {
        self.records.get(record_index).and_then(|r| r.get(column_name))
    }

    /// Name of the client identifier column
    pub fn id_column(&self) -> Option<&str> {
        self.columns.first().map(|c| c.name.as_str())
    }

    /// Client identifier of a row: the first column, trimmed.
    /// `None` when the row is missing or the cell is blank.
    pub fn client_id(&self, record_index: usize) -> Option<String> {
        let column = self.id_column()?;
        let id = self.get_value(record_index, column)?.to_string_value();
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    /// A row's fields in column order
    pub fn row_fields(&self, record_index: usize) -> Vec<(&str, &Value)> {
        let Some(record) = self.records.get(record_index) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .filter_map(|c| record.get(&c.name).map(|v| (c.name.as_str(), v)))
            .collect()
    }
}

/// Type of data source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSourceType {
    /// CSV file data source
    Csv {
        /// Path to the CSV file
        path: String,
        /// Delimiter character (comma, semicolon, tab)
        delimiter: char,
    },
    /// XLSX/XLS file data source
    Xlsx {
        /// Path to the Excel file
        path: String,
        /// Name of the sheet being used
        sheet: String,
    },
    /// Rows built in memory or parsed from a string
    Inline,
}

/// Column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column header, used as the placeholder key
    pub name: String,
    /// Detected data type of the column
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Data type for column values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Number,
    Date,
    Boolean,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Boolean => "boolean",
        }
    }

    /// Column type from the values seen in it: one consistent type wins,
    /// anything mixed (or only blanks) is text
    pub fn detect<'a>(values: impl IntoIterator<Item = &'a Value>) -> DataType {
        let mut detected: Option<DataType> = None;
        for value in values {
            let Some(data_type) = value.data_type() else {
                continue;
            };
            match detected {
                None => detected = Some(data_type),
                Some(existing) if existing == data_type => {}
                Some(_) => return DataType::Text,
            }
        }
        detected.unwrap_or(DataType::Text)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single record (row) of data, keyed by column name
pub type Record = HashMap<String, Value>;

/// A value in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Boolean(bool),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Text(_) => Some(DataType::Text),
            Value::Number(_) => Some(DataType::Number),
            Value::Date(_) => Some(DataType::Date),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Null => None,
        }
    }

    /// Text substituted into documents. Integral numbers print without a
    /// decimal part and blanks print as the empty string.
    pub fn to_string_value(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Null => String::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether a cell string means "no value"
    pub fn is_null_like(s: &str) -> bool {
        let trimmed = s.trim();
        trimmed.is_empty()
            || ["null", "na", "n/a", "#n/a"]
                .iter()
                .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    }

    /// Parse a cell string with automatic type detection.
    ///
    /// A typed value is only produced when it prints back exactly as
    /// written, so identifiers like `"0012"`, flags like `"1"` and dates
    /// like `"15/01/2024"` stay text and reach the document unchanged.
    pub fn parse_auto(s: &str) -> Value {
        let trimmed = s.trim();
        if Value::is_null_like(trimmed) {
            return Value::Null;
        }

        let candidate = match trimmed {
            "true" => Some(Value::Boolean(true)),
            "false" => Some(Value::Boolean(false)),
            _ => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(Value::Date)
                .or_else(|| trimmed.parse::<f64>().ok().filter(|n| n.is_finite()).map(Value::Number)),
        };

        match candidate {
            Some(value) if value.to_string_value() == trimmed => value,
            _ => Value::Text(trimmed.to_string()),
        }
    }
}

/// Format a float without unnecessary decimal places
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
