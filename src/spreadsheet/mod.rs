//! # Spreadsheet Reading Module
//!
//! Reads Office Open XML workbooks (`.xlsx`): the sheet list in workbook order,
//! and the cells of a single sheet with their types resolved from the styles
//! part (plain numbers, dates, times, booleans, strings and error literals).
pub mod cell;
pub mod criteria;
pub mod range;
pub(crate) mod reference;
pub mod sheet;
pub mod xlsx;

use crate::error::MergerError;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::sheet::Sheet;
use thiserror::Error;

/// Errors raised while decoding a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required part is missing from the package
    #[error("Missing part '{0}'")]
    FileError(String),

    /// The workbook declares no sheets
    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    /// Legacy binary workbook or password protected package
    #[error("Spreadsheet '{0}' is a compound document (legacy .xls or encrypted)")]
    CompoundFileError(String),

    /// Requested sheet is not part of the workbook
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// A cell value could not be decoded
    #[error("Invalid cell value at '{0}': {1}")]
    CellValueError(String, String),
}

/// A readable workbook.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads one sheet; cells outside `range` are dropped.
    fn read_sheet(&mut self, sheet_name: &str, range: Option<Range>) -> Result<Sheet, MergerError>;
}
