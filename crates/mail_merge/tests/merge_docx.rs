//! Substitution through real `.docx` packages, end to end

mod common;

use chrono::NaiveDate;
use common::{docx, paragraph, read_part};
use doc_model::RegionSet;
use mail_merge::{
    substitute, CsvParser, DataSource, DateFields, DirectorySink, LinkReport, MappingBuilder, MergeEngine,
    MergeStatus, PlaceholderMapping, Value,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use store::{DocxTemplate, MergeSettings};

fn march_fifth() -> DateFields {
    DateFields::new(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
}

fn row_mapping(dates: DateFields, row: &[(&str, &str)]) -> PlaceholderMapping {
    let values: Vec<(&str, Value)> = row.iter().map(|(k, v)| (*k, Value::parse_auto(v))).collect();
    MappingBuilder::new(dates).build(values.iter().map(|(k, v)| (*k, v)))
}

fn merge_bytes(template: &[u8], mapping: &PlaceholderMapping) -> Vec<u8> {
    let mut template = DocxTemplate::from_bytes(template).unwrap();
    substitute(template.document_mut(), mapping);
    template.to_bytes().unwrap()
}

fn text_of(bytes: &[u8]) -> String {
    DocxTemplate::from_bytes(bytes).unwrap().document().plain_text(RegionSet::all())
}

#[test]
fn test_body_table_header_and_footer() {
    let template = docx(
        &[paragraph(&["Señor ", "<Nombre>"])],
        Some(paragraph(&["NIT <NIT", ">"])),
        "Bogotá, <día> de <Mes> de <año>",
        "<MES> ${AÑO}",
    );
    let mapping = row_mapping(march_fifth(), &[("NIT", "900123456"), ("Nombres y Apellidos", "Ana María Pérez")]);

    let merged = merge_bytes(&template, &mapping);

    assert_eq!(
        text_of(&merged),
        "Señor Ana\nNIT 900123456\nBogotá, 5 de marzo de 2025\nMARZO 2025"
    );
}

#[test]
fn test_mixed_syntaxes_in_one_paragraph() {
    let template = docx(&[paragraph(&["${Nombre} y <Nombre>"])], None, "", "");
    let mapping = row_mapping(march_fifth(), &[("Nombres y Apellidos", "Ana Pérez")]);

    assert_eq!(text_of(&merge_bytes(&template, &mapping)), "Ana y Ana\n\n");
}

#[test]
fn test_row_month_overrides_derived_month() {
    let january = DateFields::new(NaiveDate::from_ymd_opt(2025, 1, 20).unwrap());
    let template = docx(&[paragraph(&["<Mes> / <mes>"])], None, "", "");
    let mapping = row_mapping(january, &[("NIT", "1"), ("Mes", "marzo")]);

    assert_eq!(text_of(&merge_bytes(&template, &mapping)), "marzo / enero\n\n");
}

#[test]
fn test_untouched_parts_stay_byte_identical() {
    let template = docx(
        &[paragraph(&["Sin ", "marcadores"]), paragraph(&["<Otro>"])],
        None,
        "Encabezado",
        "<NIT>",
    );
    let mapping = row_mapping(march_fifth(), &[("NIT", "900123456")]);

    let merged = merge_bytes(&template, &mapping);

    assert_eq!(read_part(&merged, "word/document.xml"), read_part(&template, "word/document.xml"));
    assert_eq!(read_part(&merged, "word/header1.xml"), read_part(&template, "word/header1.xml"));
    assert_ne!(read_part(&merged, "word/footer1.xml"), read_part(&template, "word/footer1.xml"));
    assert_eq!(text_of(&merged), "Sin marcadores\n<Otro>\nEncabezado\n900123456");
}

fn write_templates(dir: &std::path::Path) -> MergeSettings {
    std::fs::write(dir.join("uno.docx"), docx(&[paragraph(&["Tarifa 1 para <Nombre>"])], None, "<día> de <Mes>", "")).unwrap();
    std::fs::write(dir.join("dos.docx"), docx(&[paragraph(&["Tarifa 2 para <Nombre>"])], None, "<día> de <Mes>", "")).unwrap();

    let mut settings = MergeSettings::default();
    let kind = settings.kinds.get_mut("renovacion").unwrap();
    kind.default_template = PathBuf::from("uno.docx");
    let mut templates = BTreeMap::new();
    templates.insert("1".to_string(), PathBuf::from("uno.docx"));
    templates.insert("2".to_string(), PathBuf::from("dos.docx"));
    kind.selector.as_mut().unwrap().templates = templates;
    kind.resolve_paths(dir);
    settings
}

fn clients() -> DataSource {
    CsvParser::new()
        .parse_string(
            "NIT;Nombres y Apellidos;Indicador Tarifa\n900123456;Ana Pérez;1\n800555111;Luis Gómez;2\n;Sin Documento;1\n700999000;Eva Ríos;9\n",
            "clientes",
        )
        .unwrap()
}

#[test]
fn test_engine_writes_one_document_per_client() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_templates(dir.path());
    let out = dir.path().join("Documentos_Generados");

    let engine = MergeEngine::from_settings(clients(), &settings, "renovacion", march_fifth()).unwrap();
    let mut sink = DirectorySink::new(&out);
    let result = engine.execute(&mut sink);

    assert_eq!(result.status, MergeStatus::Completed);
    assert_eq!(result.generated_count(), 3);
    assert_eq!(result.skipped_count, 1);
    assert_eq!(result.error_count, 0);

    let expect = |nit: &str, text: &str| {
        let path = out.join("Renovaciones").join(nit).join(format!("Renovacion_2025_{}.docx", nit));
        let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        assert_eq!(text_of(&bytes), format!("{}\n5 de marzo\n", text));
    };
    expect("900123456", "Tarifa 1 para Ana");
    expect("800555111", "Tarifa 2 para Luis");
    expect("700999000", "Tarifa 1 para Eva");

    let report = LinkReport::from_result("Renovacion", &result);
    assert_eq!(report.len(), 3);
    assert_eq!(report.records()[1].client_id, "800555111");
}

#[test]
fn test_engine_progress_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_templates(dir.path());
    let engine = MergeEngine::from_settings(clients(), &settings, "renovacion", march_fifth()).unwrap();

    let preview = engine.preview(2);
    assert_eq!(preview.processed_count, 2);
    assert_eq!(preview.generated_count(), 0);
    assert_eq!(preview.merged_records[0].mapping.get("Nombre"), Some("Ana"));
    assert_eq!(preview.merged_records[1].substitution.replacements, 3);

    let mut updates = Vec::new();
    let mut sink = mail_merge::MemorySink::new();
    engine.execute_with_progress(&mut sink, |p| updates.push(p.current_record));
    assert_eq!(updates, vec![1, 2, 3, 4]);
    assert_eq!(sink.documents.len(), 3);
}
