//! File-level parser tests.

use std::io::Write;

use tempfile::{Builder, NamedTempFile};

use assay::input::ColumnKind;
use assay::{AssayError, Parser, ParserConfig, Value};

fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn create_named_file(name: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix(name)
        .suffix(".tsv")
        .rand_bytes(0)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

#[test]
fn test_tsv_file_metadata() {
    let content = "warehouse_id\tcapacity\n1\t500\n2\t750\n";
    let file = create_named_file("warehouses", content);

    let (ds, source) = Parser::new().parse_file(file.path()).unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(source.table_name(), "warehouses");
    assert_eq!(source.row_count, 2);
    assert_eq!(source.column_count, 2);
    assert_eq!(source.size_bytes, content.len() as u64);
    assert!(source.hash.starts_with("sha256:"));
    assert_eq!(source.hash.len(), "sha256:".len() + 64);
    assert_eq!(ds.numeric("capacity").unwrap(), vec![Some(500.0), Some(750.0)]);
}

#[test]
fn test_same_content_same_hash() {
    let a = create_test_file("a,b\n1,2\n");
    let b = create_test_file("a,b\n1,2\n");
    let c = create_test_file("a,b\n1,3\n");

    let parser = Parser::new();
    let hash = |f: &NamedTempFile| parser.parse_file(f.path()).unwrap().1.hash;
    assert_eq!(hash(&a), hash(&b));
    assert_ne!(hash(&a), hash(&c));
}

#[test]
fn test_null_tokens_and_type_inference() {
    let content = "supplier_id;name;active;reliability_score;onboarded\n\
                   1;Acme;true;88.5;2023-04-01\n\
                   2;NULL;false;n/a;2023-05-12\n\
                   3;Globex;TRUE;-;\n";
    let file = create_test_file(content);
    let (ds, source) = Parser::new().parse_file(file.path()).unwrap();
    assert_eq!(source.format, "csv-semicolon");

    assert_eq!(ds.column("supplier_id").unwrap().kind(), ColumnKind::Numeric);
    assert_eq!(ds.column("active").unwrap().kind(), ColumnKind::Boolean);
    assert_eq!(ds.column("onboarded").unwrap().kind(), ColumnKind::Temporal);
    assert_eq!(ds.column("name").unwrap().values[1], Value::Missing);
    assert_eq!(
        ds.numeric("reliability_score").unwrap(),
        vec![Some(88.5), None, None]
    );
    assert_eq!(ds.column("onboarded").unwrap().null_count(), 1);
}

#[test]
fn test_mixed_column_stays_text() {
    let file = create_test_file("code\n12\nA7\n3\n");
    let (ds, _) = Parser::new().parse_file(file.path()).unwrap();
    assert_eq!(ds.column("code").unwrap().values[0], Value::text("12"));
    assert!(ds.numeric("code").is_err());
}

#[test]
fn test_max_rows_and_explicit_delimiter() {
    let parser = Parser::with_config(ParserConfig {
        delimiter: Some(b'|'),
        max_rows: Some(2),
        ..ParserConfig::default()
    });
    let file = create_test_file("a|b\n1|2\n3|4\n5|6\n");
    let (ds, source) = parser.parse_file(file.path()).unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(source.format, "psv");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Parser::new()
        .parse_file(dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, AssayError::Io { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_empty_file_is_rejected() {
    let file = create_test_file("");
    let err = Parser::new().parse_file(file.path()).unwrap_err();
    assert!(matches!(err, AssayError::EmptyData(_)));
}
