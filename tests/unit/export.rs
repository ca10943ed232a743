use pretty_assertions::assert_eq;

use crate::common::test_data;
use stock_dashboard::export::{export_to_file, import_from_file};

#[test]
fn test_export_then_reimport_yields_same_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_data.csv");

    let mut rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 20);
    rows[3].close = 71_234.5;

    export_to_file(&path, &rows).unwrap();
    assert_eq!(import_from_file(&path).unwrap(), rows);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Date,Open,High,Low,Close,Volume\n2024-01-01,"));
}

#[test]
fn test_export_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stock_data.csv");

    let rows = test_data::create_trading_rows(test_data::date(2024, 1, 1), 20);
    export_to_file(&path, &rows).unwrap();
    export_to_file(&path, &rows[..1]).unwrap();

    assert_eq!(import_from_file(&path).unwrap().len(), 1);
}

#[test]
fn test_import_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(import_from_file(dir.path().join("absent.csv")).is_err());
}
