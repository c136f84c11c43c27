//! XLSX/XLS parser for row sources

use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use chrono::NaiveDate;

use crate::data_source::{ColumnDef, DataSource, DataSourceType, DataType, Record, Value};
use crate::error::{MailMergeError, Result};

/// Selector for which sheet to read from a workbook
#[derive(Debug, Clone, Default)]
pub enum SheetSelector {
    /// Select sheet by name
    ByName(String),
    /// Select sheet by index (0-based)
    ByIndex(usize),
    /// Select the first sheet
    #[default]
    First,
}

/// XLSX parser configuration
#[derive(Debug, Clone)]
pub struct XlsxConfig {
    /// Sheet name or index to read from
    pub sheet: SheetSelector,
    /// Whether to trim whitespace from string values
    pub trim_whitespace: bool,
    /// Skip rows where every cell is empty
    pub skip_empty_rows: bool,
}

impl Default for XlsxConfig {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::First,
            trim_whitespace: true,
            skip_empty_rows: true,
        }
    }
}

impl XlsxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sheet to read by name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet = SheetSelector::ByName(name.into());
        self
    }

    /// Set the sheet to read by index (0-based)
    pub fn with_sheet_index(mut self, index: usize) -> Self {
        self.sheet = SheetSelector::ByIndex(index);
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    pub fn with_skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }
}

/// Reads the client sheet of a workbook into a [`DataSource`].
///
/// The first row holds the column headers. String cells are kept as text,
/// numeric cells become numbers and date-formatted cells become dates.
pub struct XlsxParser {
    config: XlsxConfig,
}

impl XlsxParser {
    /// Create a new XLSX parser with default configuration
    pub fn new() -> Self {
        Self {
            config: XlsxConfig::default(),
        }
    }

    /// Create a new XLSX parser with custom configuration
    pub fn with_config(config: XlsxConfig) -> Self {
        Self { config }
    }

    /// Parse an `.xlsx` or `.xls` workbook from disk
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<DataSource> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)
            .map_err(|e| MailMergeError::XlsxParse(format!("Failed to open workbook: {}", e)))?;

        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("xlsx_source")
            .to_string();

        let sheet_name = self.get_sheet_name(&workbook.sheet_names())?;
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;

        let source_type = DataSourceType::Xlsx {
            path: path.display().to_string(),
            sheet: sheet_name,
        };
        self.parse_range(&range, id, source_type)
    }

    /// Parse an `.xlsx` workbook held in memory
    pub fn parse_bytes(&self, data: &[u8], id: impl Into<String>) -> Result<DataSource> {
        let mut workbook: Xlsx<_> = Xlsx::new(std::io::Cursor::new(data)).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to read workbook from bytes: {}", e))
        })?;
        self.parse_workbook(&mut workbook, id.into())
    }

    fn parse_workbook<RS: Read + Seek>(&self, workbook: &mut Xlsx<RS>, id: String) -> Result<DataSource> {
        let sheet_name = self.get_sheet_name(&workbook.sheet_names())?;
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            MailMergeError::XlsxParse(format!("Failed to read sheet '{}': {}", sheet_name, e))
        })?;
        self.parse_range(&range, id, DataSourceType::Inline)
    }

    /// Resolve the configured sheet against the workbook's sheet names
    fn get_sheet_name(&self, sheet_names: &[String]) -> Result<String> {
        let Some(first) = sheet_names.first() else {
            return Err(MailMergeError::EmptyDataSource("Workbook has no sheets".to_string()));
        };

        match &self.config.sheet {
            SheetSelector::ByName(name) => {
                if sheet_names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(MailMergeError::XlsxParse(format!(
                        "Sheet '{}' not found. Available sheets: {:?}",
                        name, sheet_names
                    )))
                }
            }
            SheetSelector::ByIndex(index) => sheet_names.get(*index).cloned().ok_or_else(|| {
                MailMergeError::XlsxParse(format!(
                    "Sheet index {} out of range. Workbook has {} sheets",
                    index,
                    sheet_names.len()
                ))
            }),
            SheetSelector::First => Ok(first.clone()),
        }
    }

    /// Turn a sheet range into a DataSource, header row first
    fn parse_range(&self, range: &Range<Data>, id: String, source_type: DataSourceType) -> Result<DataSource> {
        if range.is_empty() {
            return Err(MailMergeError::EmptyDataSource("Excel sheet is empty".to_string()));
        }

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| self.header_name(i, cell))
                .collect(),
            None => return Err(MailMergeError::EmptyDataSource("Excel sheet has no header row".to_string())),
        };

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(MailMergeError::DuplicateColumn(header.clone()));
            }
        }

        let values: Vec<Vec<Value>> = rows
            .filter(|row| !(self.config.skip_empty_rows && row.iter().all(|c| matches!(c, Data::Empty))))
            .map(|row| row.iter().map(|cell| self.cell_to_value(cell)).collect())
            .collect();

        let mut data_source = DataSource::new(id, source_type);
        for (i, header) in headers.iter().enumerate() {
            let data_type = DataType::detect(values.iter().filter_map(|row| row.get(i)));
            data_source.add_column(ColumnDef::new(header.clone(), data_type));
        }

        for row in values {
            let record: Record = headers.iter().cloned().zip(row).collect();
            data_source.add_record(record);
        }

        Ok(data_source)
    }

    /// Header text for a column; blank headers get a positional name
    fn header_name(&self, index: usize, cell: &Data) -> String {
        let name = match cell {
            Data::String(s) if self.config.trim_whitespace => s.trim().to_string(),
            Data::String(s) => s.clone(),
            Data::Empty => String::new(),
            other => self.cell_to_value(other).to_string_value(),
        };
        if name.is_empty() {
            format!("Column{}", index + 1)
        } else {
            name
        }
    }

    /// Convert a sheet cell to a [`Value`]
    fn cell_to_value(&self, cell: &Data) -> Value {
        match cell {
            Data::Empty => Value::Null,
            Data::String(s) => {
                let text = if self.config.trim_whitespace { s.trim() } else { s.as_str() };
                if Value::is_null_like(text) {
                    Value::Null
                } else {
                    Value::Text(text.to_string())
                }
            }
            Data::Int(n) => Value::Number(*n as f64),
            // Dates only come from date-formatted cells, never from plain floats
            Data::Float(n) => Value::Number(*n),
            Data::Bool(b) => Value::Boolean(*b),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                match excel_datetime_to_date(serial) {
                    Some(date) => Value::Date(date),
                    None => Value::Number(serial),
                }
            }
            Data::DateTimeIso(s) => match try_parse_iso_date(s) {
                Some(date) => Value::Date(date),
                None => Value::Text(s.clone()),
            },
            Data::DurationIso(s) => Value::Text(s.clone()),
            Data::Error(e) => Value::Text(format!("#ERROR:{:?}", e)),
        }
    }
}

impl Default for XlsxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an Excel serial date to a calendar date.
///
/// Serial 1 is 1900-01-01. Excel counts a nonexistent 1900-02-29 (serial
/// 60), so serials from 61 on are one day ahead of a plain day count.
fn excel_datetime_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as i64;
    let epoch = if days < 61 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(chrono::Duration::days(days))
}

/// Try to parse an ISO date or datetime string
fn try_parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"] {
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }
    s.split('T')
        .next()
        .and_then(|date_part| NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok())
}

/// Sheet names of a workbook on disk
pub fn get_sheet_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MailMergeError::FileNotFound(path.display().to_string()));
    }

    let workbook = open_workbook_auto(path)
        .map_err(|e| MailMergeError::XlsxParse(format!("Failed to open workbook: {}", e)))?;

    Ok(workbook.sheet_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_xlsx_config_builder() {
        let config = XlsxConfig::new()
            .with_sheet_name("Clientes")
            .with_trim(false)
            .with_skip_empty_rows(false);

        assert!(!config.trim_whitespace);
        assert!(!config.skip_empty_rows);
        assert!(matches!(config.sheet, SheetSelector::ByName(ref name) if name == "Clientes"));
        assert!(matches!(XlsxConfig::new().with_sheet_index(2).sheet, SheetSelector::ByIndex(2)));
        assert!(matches!(SheetSelector::default(), SheetSelector::First));
    }

    #[test]
    fn test_excel_datetime_to_date() {
        let date = excel_datetime_to_date(45292.0).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 1));

        let with_time = excel_datetime_to_date(45306.75).unwrap();
        assert_eq!(with_time, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert_eq!(excel_datetime_to_date(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(excel_datetime_to_date(61.0), NaiveDate::from_ymd_opt(1900, 3, 1));
        assert_eq!(excel_datetime_to_date(0.0), None);
    }

    #[test]
    fn test_try_parse_iso_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(try_parse_iso_date("2024-01-15"), expected);
        assert_eq!(try_parse_iso_date("2024-01-15T10:30:00"), expected);
        assert_eq!(try_parse_iso_date("2024-01-15T10:30:00.123Z"), expected);
        assert_eq!(try_parse_iso_date("15/01/2024"), None);
    }

    #[test]
    fn test_cell_to_value() {
        let parser = XlsxParser::new();
        assert_eq!(parser.cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(parser.cell_to_value(&Data::String("  Ana  ".to_string())), Value::Text("Ana".to_string()));
        assert_eq!(parser.cell_to_value(&Data::String("#N/A".to_string())), Value::Null);
        assert_eq!(parser.cell_to_value(&Data::String("0012".to_string())), Value::Text("0012".to_string()));
        assert_eq!(parser.cell_to_value(&Data::Float(900123456.0)).to_string_value(), "900123456");
        assert_eq!(parser.cell_to_value(&Data::Int(7)), Value::Number(7.0));
        assert_eq!(parser.cell_to_value(&Data::Bool(true)), Value::Boolean(true));
        assert_eq!(
            parser.cell_to_value(&Data::DateTimeIso("2024-03-01T00:00:00".to_string())),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_header_names() {
        let parser = XlsxParser::new();
        assert_eq!(parser.header_name(0, &Data::String(" NIT ".to_string())), "NIT");
        assert_eq!(parser.header_name(2, &Data::Empty), "Column3");
        assert_eq!(parser.header_name(1, &Data::Float(2024.0)), "2024");
    }

    #[test]
    fn test_parse_range() {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("NIT".to_string()));
        range.set_value((0, 1), Data::String("Ciudad".to_string()));
        range.set_value((1, 0), Data::Float(900123456.0));
        range.set_value((1, 1), Data::String("Bogotá".to_string()));
        range.set_value((3, 0), Data::Float(800555111.0));

        let ds = XlsxParser::new()
            .parse_range(&range, "clientes".to_string(), DataSourceType::Inline)
            .unwrap();

        assert_eq!(ds.column_names(), vec!["NIT", "Ciudad"]);
        assert_eq!(ds.record_count(), 2);
        assert_eq!(ds.client_id(1).as_deref(), Some("800555111"));
        assert!(ds.get_value(1, "Ciudad").unwrap().is_null());
        assert_eq!(ds.get_column("NIT").unwrap().data_type, DataType::Number);
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("NIT".to_string()));
        range.set_value((0, 1), Data::String("NIT".to_string()));

        let result = XlsxParser::new().parse_range(&range, "x".to_string(), DataSourceType::Inline);
        assert!(matches!(result, Err(MailMergeError::DuplicateColumn(_))));
    }

    #[test]
    fn test_parser_file_not_found() {
        let result = XlsxParser::new().parse_file("/nonexistent/clientes.xlsx");
        assert!(matches!(result, Err(MailMergeError::FileNotFound(_))));
    }
}
