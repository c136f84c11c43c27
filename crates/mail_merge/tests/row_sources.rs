//! Reading client sheets from real workbook and CSV files

mod common;

use mail_merge::{load_from_file, DataType, MailMergeError, SheetSelector, Value, XlsxConfig, XlsxParser};

fn clients_workbook() -> Vec<u8> {
    common::xlsx(
        "Clientes",
        &[
            &["NIT", "Nombres y Apellidos", "Razon Social", "Indicador Tarifa", "Ciudad"],
            &["900123456", "Ana María Pérez", "Acme S.A.S.", "1", "Bogotá"],
            &["0012", "Luis Gómez", "Beta Ltda", "2", "N/A"],
            &["", "", "", "", ""],
            &["800555111", "Eva Ríos", "Gamma", "", "  Cali  "],
        ],
    )
}

#[test]
fn test_workbook_from_bytes() {
    let ds = XlsxParser::new().parse_bytes(&clients_workbook(), "clientes").unwrap();

    assert_eq!(
        ds.column_names(),
        vec!["NIT", "Nombres y Apellidos", "Razon Social", "Indicador Tarifa", "Ciudad"]
    );
    assert_eq!(ds.record_count(), 3);

    assert_eq!(ds.client_id(0).as_deref(), Some("900123456"));
    assert_eq!(ds.client_id(1).as_deref(), Some("0012"));
    assert_eq!(ds.get_value(0, "Indicador Tarifa").unwrap().to_string_value(), "1");
    assert!(ds.get_value(1, "Ciudad").unwrap().is_null());
    assert_eq!(ds.get_value(2, "Ciudad"), Some(&Value::Text("Cali".to_string())));
    assert_eq!(ds.get_column("Nombres y Apellidos").unwrap().data_type, DataType::Text);
}

#[test]
fn test_workbook_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientes.xlsx");
    std::fs::write(&path, clients_workbook()).unwrap();

    let ds = load_from_file(&path).unwrap();
    assert_eq!(ds.id, "clientes");
    assert_eq!(ds.record_count(), 3);
    assert_eq!(mail_merge::get_sheet_names(&path).unwrap(), vec!["Clientes".to_string()]);
}

#[test]
fn test_unknown_sheet_is_reported() {
    let parser = XlsxParser::with_config(XlsxConfig::new().with_sheet_name("Hoja2"));
    let result = parser.parse_bytes(&clients_workbook(), "clientes");
    assert!(matches!(result, Err(MailMergeError::XlsxParse(_))));

    let parser = XlsxParser::with_config(XlsxConfig { sheet: SheetSelector::ByIndex(0), ..Default::default() });
    assert!(parser.parse_bytes(&clients_workbook(), "clientes").is_ok());
}

#[test]
fn test_not_a_workbook() {
    let result = XlsxParser::new().parse_bytes(b"NIT,Ciudad", "x");
    assert!(matches!(result, Err(MailMergeError::XlsxParse(_))));
}

#[test]
fn test_csv_and_xlsx_agree() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("clientes.csv");
    std::fs::write(
        &csv_path,
        "NIT;Nombres y Apellidos;Razon Social;Indicador Tarifa;Ciudad\n900123456;Ana María Pérez;Acme S.A.S.;1;Bogotá\n",
    )
    .unwrap();
    let from_csv = load_from_file(&csv_path).unwrap();
    let from_xlsx = XlsxParser::new().parse_bytes(&clients_workbook(), "clientes").unwrap();

    for column in from_csv.column_names() {
        assert_eq!(
            from_csv.get_value(0, column).map(Value::to_string_value),
            from_xlsx.get_value(0, column).map(Value::to_string_value),
            "column {}",
            column
        );
    }
}
