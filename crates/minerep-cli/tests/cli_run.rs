//! End-to-end tests driving the compiled binary.
//!
//! Exit code contract: 0 on success, 1 on any unrecoverable error
//! (unreadable file, missing sheet, no usable data).

use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn minerep() -> Command {
    Command::new(env!("CARGO_BIN_EXE_minerep"))
}

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("produccion.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Mensual").unwrap();

    let headers = [
        "Metric", "Category", "Unit", "ene-20", "feb-20", "mar-20", "abr-20", "may-20", "jun-20",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    let rows: [(&str, &str, &str, [f64; 6]); 6] = [
        ("Ore Mined", "RGM", "kt", [406.8, 549.1, 512.3, 488.0, 530.2, 498.7]),
        ("Ore Mined", "Sar", "kt", [201.4, 255.0, 240.8, 232.1, 250.9, 244.3]),
        ("Overburden", "RGM", "kt", [1200.0, 1000.5, 1150.2, 1080.3, 1120.8, 1095.0]),
        ("Overburden", "Sar", "kt", [600.2, 500.1, 575.4, 540.9, 560.2, 547.5]),
        ("Active Fleet Count (Aprox)", "", "", [40.0, 42.0, 41.0, 40.0, 43.0, 42.0]),
        (
            "Liter of Diesel Consumed",
            "",
            "",
            [2.0e6, 2.1e6, 1.9e6, 2.05e6, 2.2e6, 2.1e6],
        ),
    ];
    for (r, (metric, category, unit, values)) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        sheet.write_string(r, 0, *metric).unwrap();
        sheet.write_string(r, 1, *category).unwrap();
        sheet.write_string(r, 2, *unit).unwrap();
        for (c, value) in values.iter().enumerate() {
            sheet.write_number(r, c as u16 + 3, *value).unwrap();
        }
    }

    workbook.save(&path).unwrap();
    path
}

#[test]
fn full_run_writes_report_beside_input() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());

    let output = minerep().arg(&input).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Report complete"));
    assert!(stdout.contains("produccion_with_charts.xlsx"));

    let report_path = dir.path().join("produccion_with_charts.xlsx");
    assert!(report_path.exists());

    let workbook = open_workbook_auto(&report_path).unwrap();
    let names = workbook.sheet_names().to_owned();
    assert_eq!(
        names,
        vec![
            "Summary",
            "Processed_Data",
            "Production Overview",
            "Efficiency Analysis",
            "Comparative Analysis",
            "Trend Analysis",
        ]
    );
}

#[test]
fn named_sheet_and_output_override() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());
    let report_path = dir.path().join("custom.xlsx");

    let status = minerep()
        .arg(&input)
        .arg("Mensual")
        .arg("--output")
        .arg(&report_path)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(report_path.exists());
}

#[test]
fn missing_input_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("nope.xlsx");

    let output = minerep().arg(&input).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("nope_with_charts.xlsx").exists());
}

#[test]
fn missing_sheet_exits_nonzero_and_names_alternatives() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path());

    let output = minerep().arg(&input).arg("Resumen").output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Resumen"));
    assert!(!dir.path().join("produccion_with_charts.xlsx").exists());
}
