//! Integration tests loading real xlsx files from disk

use chrono::NaiveDate;
use minerep_parser::{load_table, LoadError};
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("production.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Produccion").unwrap();

    let headers = ["Metric", "Category", "Unit", "ene-20", "feb-20", "mar-20"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    sheet.write_string(1, 0, "Ore Mined").unwrap();
    sheet.write_string(1, 1, "RGM").unwrap();
    sheet.write_string(1, 2, "kt").unwrap();
    sheet.write_number(1, 3, 406.8).unwrap();
    sheet.write_number(1, 4, 549.1).unwrap();
    sheet.write_number(1, 5, 512.3).unwrap();

    sheet.write_string(2, 0, "Overburden").unwrap();
    sheet.write_string(2, 1, "RGM").unwrap();
    sheet.write_string(2, 2, "kt").unwrap();
    sheet.write_number(2, 3, 1200.0).unwrap();
    // feb-20 left blank on purpose
    sheet.write_number(2, 5, 1350.0).unwrap();

    sheet.write_string(3, 0, "Active Fleet Count (Aprox)").unwrap();
    sheet.write_number(3, 3, 40.0).unwrap();
    sheet.write_number(3, 4, 42.0).unwrap();
    sheet.write_number(3, 5, 41.0).unwrap();

    workbook.save(&path).unwrap();
    path
}

#[test]
fn loads_first_sheet_by_default() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let table = load_table(&path, None).unwrap();

    assert_eq!(table.months_covered(), 3);
    assert_eq!(table.filled_cells, 1);

    let ore = table.series("Ore Mined", Some("RGM"));
    assert_eq!(ore.get(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()), Some(406.8));

    let overburden = table.series("Overburden", Some("RGM"));
    assert_eq!(
        overburden.get(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap()),
        Some(0.0)
    );

    let fleet = table.series("Active Fleet Count (Aprox)", None);
    assert_eq!(fleet.len(), 3);
}

#[test]
fn loads_named_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let table = load_table(&path, Some("Produccion")).unwrap();
    assert_eq!(table.months_covered(), 3);
}

#[test]
fn missing_sheet_lists_available_names() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let err = load_table(&path, Some("Resumen")).unwrap_err();
    match err {
        LoadError::SheetNotFound { name, available } => {
            assert_eq!(name, "Resumen");
            assert!(available.contains("Produccion"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
