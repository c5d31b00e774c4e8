//! Workbook output through `rust_xlsxwriter`.

use crate::conf::FMT_DATE;
use crate::conf::FMT_DATETIME;
use crate::conf::FMT_TIME;
use crate::conf::OUTPUT_SHEET_NAME;
use crate::error::MergerError;
use crate::error::ResultMessage;
use crate::pipeline::merge::MergedTable;
use crate::spreadsheet::cell::CellValue;
use rust_xlsxwriter::Format;
use rust_xlsxwriter::Workbook;
use rust_xlsxwriter::Worksheet;
use std::path::Path;

/// Number formats for date and time serials; nothing else is styled.
pub(crate) struct CellFormats {
    date: Format,
    datetime: Format,
    time: Format,
}

impl Default for CellFormats {
    fn default() -> Self {
        CellFormats {
            date: Format::new().set_num_format(FMT_DATE),
            datetime: Format::new().set_num_format(FMT_DATETIME),
            time: Format::new().set_num_format(FMT_TIME),
        }
    }
}

/// Writes one value at 0-based (row, col). Blank values, error literals and
/// missing-value markers included, leave the cell empty.
pub(crate) fn write_cell(
    worksheet: &mut Worksheet,
    row: usize,
    col: usize,
    value: &CellValue,
    formats: &CellFormats,
) -> Result<(), MergerError> {
    if value.is_blank() {
        return Ok(());
    }
    let row = u32::try_from(row)?;
    let col = u16::try_from(col)?;
    match value {
        CellValue::Empty | CellValue::Error(_) => (),
        CellValue::Text(text) => {
            worksheet.write_string(row, col, text)?;
        }
        CellValue::Number(number) => {
            worksheet.write_number(row, col, *number)?;
        }
        CellValue::Boolean(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::Date(serial) => {
            worksheet.write_number_with_format(row, col, *serial, &formats.date)?;
        }
        CellValue::DateTime(serial) => {
            worksheet.write_number_with_format(row, col, *serial, &formats.datetime)?;
        }
        CellValue::Time(serial) => {
            worksheet.write_number_with_format(row, col, *serial, &formats.time)?;
        }
    }
    Ok(())
}

/// Builds the single-sheet workbook: header row of labels, then one row per merged row.
fn build_workbook(table: &MergedTable) -> Result<Workbook, MergerError> {
    let formats = CellFormats::default();
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET_NAME)?;
    for (col, label) in table.labels().iter().enumerate() {
        worksheet.write_string(0, u16::try_from(col)?, label)?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let mut first_col = 0;
        if let Some(tag) = &row.tag {
            worksheet.write_string(u32::try_from(index + 1)?, 0, tag)?;
            first_col = 1;
        }
        for (col, value) in row.values.iter().enumerate() {
            write_cell(worksheet, index + 1, first_col + col, value, &formats)?;
        }
    }
    Ok(workbook)
}

/// Serializes the merged table to `.xlsx` bytes without touching the disk.
pub fn serialize(table: &MergedTable) -> Result<Vec<u8>, MergerError> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

/// Writes the merged table to `path`, creating parent directories.
pub fn save(table: &MergedTable, path: &Path) -> Result<(), MergerError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(MergerError::from)
            .with_prefix(&parent.display().to_string())?;
    }
    let mut workbook = build_workbook(table)?;
    workbook
        .save(path)
        .map_err(MergerError::from)
        .with_prefix(&path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::Row;
    use crate::pipeline::extract::Schema;
    use crate::spreadsheet::xlsx::XlsxSpreadsheet;
    use crate::spreadsheet::Spreadsheet;
    use std::sync::Arc;

    fn table() -> MergedTable {
        MergedTable {
            schema: Schema::new(Some("Panchayat Name")),
            rows: vec![Row {
                tag: Some("Aamalva".to_owned()),
                values: [
                    CellValue::from("Ward 1"),
                    CellValue::Number(12.0),
                    CellValue::Date(45_292.0),
                    CellValue::Empty,
                    CellValue::Boolean(false),
                ],
            }],
        }
    }

    #[test]
    fn serialized_workbook_reads_back() {
        let bytes = serialize(&table()).unwrap();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("merged.xlsx", Arc::from(bytes)).unwrap();
        assert_eq!(spreadsheet.sheet_names(), vec!["Sheet1"]);

        let rows = spreadsheet.read_sheet("Sheet1", None).unwrap().rows_from(0);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ["Panchayat Name", "B", "C", "D", "E", "F"].map(CellValue::from).to_vec()
        );
        assert_eq!(
            rows[1],
            vec![
                CellValue::from("Aamalva"),
                CellValue::from("Ward 1"),
                CellValue::Number(12.0),
                CellValue::Date(45_292.0),
                CellValue::Empty,
                CellValue::Boolean(false),
            ]
        );
    }

    #[test]
    fn missing_values_are_written_empty() {
        let table = MergedTable {
            schema: Schema::new(Some("Panchayat Name")),
            rows: vec![Row {
                tag: Some("NA".to_owned()),
                values: [
                    CellValue::Error("#N/A".to_owned()),
                    CellValue::from("N/A"),
                    CellValue::from("null"),
                    CellValue::from("n.a."),
                    CellValue::Number(3.0),
                ],
            }],
        };
        let bytes = serialize(&table).unwrap();
        let mut spreadsheet = XlsxSpreadsheet::from_bytes("merged.xlsx", Arc::from(bytes)).unwrap();
        let rows = spreadsheet.read_sheet("Sheet1", None).unwrap().rows_from(0);
        assert_eq!(
            rows[1],
            vec![
                CellValue::from("NA"),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Empty,
                CellValue::from("n.a."),
                CellValue::Number(3.0),
            ]
        );
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("merged.xlsx");
        save(&table(), &path).unwrap();
        assert!(path.is_file());
    }
}
