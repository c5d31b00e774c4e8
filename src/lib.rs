//! # Draft Roll Control Chart Merger
//!
//! Merges the "Draft Roll Control Chart" sheet of many `.xlsx` workbooks into a
//! single workbook.
//!
//! Every source follows one fixed template: the first 10 rows are a header block
//! and the data lives in columns B through F. For each workbook the merger
//!
//! - locates the target sheet, by exact name or by auto-detection (first sheet
//!   whose normalized name contains both `draft` and `roll`),
//! - drops the header block and keeps the B..F window, labelled `B C D E F`,
//! - drops rows blank in all five cells,
//! - optionally prepends a `Panchayat Name` column holding the text of the file
//!   name before `-Format-A1`,
//!
//! then concatenates the results in file order and writes one sheet whose first
//! row holds the column labels.
//!
//! ## Run modes
//!
//! - **files**: explicit files read into memory, merged workbook returned as bytes
//! - **folder**: all workbooks of a directory, merged workbook written to a path
//! - **clean**: two phases, trimmed mirrors of every workbook first, then the merge
//!   over the mirrors
//!
//! ```no_run
//! use draft_roll_merger::pipeline::source::scan_directory;
//! use draft_roll_merger::pipeline::{sink, MergeOptions, Merger};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), draft_roll_merger::error::MergerError> {
//! let sources = scan_directory(Path::new("data-a1"))?;
//! let report = Merger::new(MergeOptions::default())?.run(&sources)?;
//! sink::save(&report.table, Path::new("MERGED_DRAFT_ROLL_CONTROL_CHART.xlsx"))?;
//! # Ok(())
//! # }
//! ```

pub mod conf;
pub mod error;
mod helpers;
pub mod pipeline;
pub mod spreadsheet;

pub use crate::error::MergerError;
pub use crate::pipeline::merge::MergedTable;
pub use crate::pipeline::MergeOptions;
pub use crate::pipeline::MergeReport;
pub use crate::pipeline::Merger;
pub use crate::spreadsheet::criteria::SheetLocator;
