//! Compiled-in constants of the merge.
//!
//! Every source workbook is assumed to follow one fixed template: a header
//! block of [`N_ROWS_TO_SKIP`] rows above the data, and the data in columns
//! B through F of the target sheet.

/// Leading rows removed from every sheet before extraction.
pub const N_ROWS_TO_SKIP: usize = 10;
/// Sheet read when the sheet name is fixed.
pub const TARGET_SHEET_NAME: &str = "Draft Roll Control Chart";
/// Tokens a normalized sheet name must all contain to be auto-detected.
pub const AUTO_DETECT_SHEET_TOKENS: [&str; 2] = ["draft", "roll"];
/// Column window kept from the target sheet.
pub const USE_COLS: &str = "B:F";
/// Labels of the kept columns, in order; part of the output contract.
pub const COLUMN_LABELS: [&str; 5] = ["B", "C", "D", "E", "F"];
/// Number of columns in the kept window.
pub const N_WINDOW_COLS: usize = COLUMN_LABELS.len();

/// The tag is the file name text before this marker.
pub const TAG_MARKER: &str = "-Format-A1";
/// Tag used when the marker is absent from the file name.
pub const TAG_FALLBACK: &str = "UNKNOWN";
/// Header of the leading tag column.
pub const TAG_COLUMN_NAME: &str = "Panchayat Name";

/// Directory scanned for source workbooks, relative to the base directory.
pub const INPUT_FOLDER: &str = "data-a1";
/// Directory receiving trimmed mirror files in the two-phase mode.
pub const CLEANED_FOLDER: &str = "cleaned";
/// Name of the merged workbook.
pub const FINAL_OUTPUT: &str = "MERGED_DRAFT_ROLL_CONTROL_CHART.xlsx";
/// Extension of source workbooks (compared case-insensitively).
pub const SOURCE_EXTENSION: &str = "xlsx";
/// Prefix of transient lock files written by spreadsheet applications.
pub const LOCK_FILE_PREFIX: &str = "~$";
/// Name of the single sheet in the merged workbook.
pub const OUTPUT_SHEET_NAME: &str = "Sheet1";

/// Number formats used when writing date and time cells.
pub const FMT_DATE: &str = "yyyy-mm-dd";
pub const FMT_DATETIME: &str = "yyyy-mm-dd hh:mm:ss";
pub const FMT_TIME: &str = "hh:mm:ss";

/// Text values read as missing, compared exactly. A row whose window holds only
/// these, empty cells or error literals is dropped.
pub const NA_STRINGS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
