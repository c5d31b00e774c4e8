use draft_roll_merger::conf::FINAL_OUTPUT;
use draft_roll_merger::spreadsheet::cell::CellValue;
use draft_roll_merger::spreadsheet::xlsx::XlsxSpreadsheet;
use draft_roll_merger::spreadsheet::Spreadsheet;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::process::Command;
use std::process::Output;
use std::sync::Arc;

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_draft-roll-merger"));
    command.env("RUST_LOG", "info");
    command
}

/// 10 header rows and `data_rows` rows of text in B..F.
fn workbook(sheet_name: &str, data_rows: u32) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();
    for row in 0..10u32 {
        worksheet.write_string(row, 1, "header").unwrap();
    }
    for row in 10..10 + data_rows {
        for col in 1..=5u16 {
            worksheet.write_string(row, col, format!("r{row}c{col}")).unwrap();
        }
    }
    workbook.save_to_buffer().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn missing_input_folder_fails() {
    let base = tempfile::tempdir().unwrap();
    let output = cli().arg("folder").arg("--base-dir").arg(base.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Input folder not found"), "stderr:\n{}", stderr(&output));
}

#[test]
fn folder_without_workbooks_fails() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("data-a1");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("~$a.xlsx"), b"lock").unwrap();

    let output = cli().arg("folder").arg("--base-dir").arg(base.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No Excel files found"), "stderr:\n{}", stderr(&output));
}

#[test]
fn nothing_mergeable_fails_without_output() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("data-a1");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("short.xlsx"), workbook("Draft Roll Control Chart", 0)).unwrap();

    let output = cli().arg("folder").arg("--base-dir").arg(base.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No valid data found to merge"), "stderr:\n{}", stderr(&output));
    assert!(!base.path().join(FINAL_OUTPUT).exists());
}

#[test]
fn folder_writes_merged_workbook() {
    let base = tempfile::tempdir().unwrap();
    let input = base.path().join("data-a1");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("Aamalva-Format-A1.xlsx"), workbook("draft roll", 2)).unwrap();
    fs::write(input.join("Bassi-Format-A1.xlsx"), workbook("Draft Roll Sheet", 1)).unwrap();

    let output = cli()
        .args(["--auto-sheet", "--tag", "folder", "--base-dir"])
        .arg(base.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    let mut merged = XlsxSpreadsheet::open(&base.path().join(FINAL_OUTPUT)).unwrap();
    let rows = merged.read_sheet("Sheet1", None).unwrap().rows_from(0);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], CellValue::from("Panchayat Name"));
    assert_eq!(rows[3][0], CellValue::from("Bassi"));
}

#[test]
fn files_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.xlsx");
    let second = dir.path().join("b.xlsx");
    fs::write(&first, workbook("Draft Roll Control Chart", 1)).unwrap();
    fs::write(&second, workbook("Cover", 3)).unwrap();

    let output = cli()
        .arg("files")
        .arg(&first)
        .arg(&second)
        .args(["--output", "-"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));
    assert!(stderr(&output).contains("Skipped b.xlsx"));

    let mut merged = XlsxSpreadsheet::from_bytes("stdout.xlsx", Arc::from(output.stdout)).unwrap();
    let rows = merged.read_sheet("Sheet1", None).unwrap().rows_from(0);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], CellValue::from("r10c1"));
}
