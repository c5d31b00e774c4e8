//! # Merge Pipeline
//!
//! Enumerator → (sheet locator → extractor → tag injector) per file → merger → sink.
//! Files are processed one at a time in enumeration order. A failure inside one
//! file becomes a [`FileWarning`] and the run moves on; only the conditions in
//! [`PipelineError`] end a run.
pub mod extract;
pub mod merge;
pub mod mirror;
pub mod sink;
pub mod source;
pub mod tag;

use crate::conf::N_ROWS_TO_SKIP;
use crate::conf::TARGET_SHEET_NAME;
use crate::conf::USE_COLS;
use crate::error::MergerError;
use crate::pipeline::extract::ExtractedTable;
use crate::pipeline::extract::Extractor;
use crate::pipeline::merge::merge;
use crate::pipeline::merge::MergedTable;
use crate::pipeline::source::Source;
use crate::pipeline::tag::TagInjector;
use crate::spreadsheet::criteria::SheetLocator;
use crate::spreadsheet::Spreadsheet;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing::warn;

/// Conditions that stop a run before any output is written.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Input folder not found: {}", .0.display())]
    MissingInputLocation(PathBuf),

    #[error("No Excel files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("No valid data found to merge")]
    NoMergeableData,

    #[error("Columns of '{source_name}' are {found:?}, expected {expected:?}")]
    SchemaMismatch {
        source_name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Why a single workbook contributed nothing.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    #[error("sheet not found ({0})")]
    SheetNotFound(String),

    #[error("no valid data")]
    EmptyAfterFilter,

    #[error("unreadable workbook: {0}")]
    UnreadableWorkbook(String),
}

/// A skipped workbook and the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileWarning {
    pub file_name: String,
    pub reason: SkipReason,
}

impl Display for FileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Skipped {}: {}", self.file_name, self.reason)
    }
}

/// Run settings; `Default` reproduces the compiled-in configuration.
#[derive(Clone, Debug)]
pub struct MergeOptions {
    pub locator: SheetLocator,
    pub rows_to_skip: usize,
    /// Column window as an A1 range, e.g. `"B:F"`
    pub use_cols: String,
    /// Prepend the label derived from the file name
    pub tag: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            locator: SheetLocator::Fixed(TARGET_SHEET_NAME.to_owned()),
            rows_to_skip: N_ROWS_TO_SKIP,
            use_cols: USE_COLS.to_owned(),
            tag: false,
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct MergeReport {
    pub table: MergedTable,
    /// Workbooks enumerated
    pub files_seen: usize,
    /// Workbooks that contributed rows
    pub files_merged: usize,
    pub warnings: Vec<FileWarning>,
}

impl MergeReport {
    pub fn total_rows(&self) -> usize {
        self.table.len()
    }
}

pub struct Merger {
    locator: SheetLocator,
    extractor: Extractor,
    tagger: Option<TagInjector>,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Result<Self, MergerError> {
        let tagger = options.tag.then(TagInjector::default);
        let extractor = Extractor::new(
            options.rows_to_skip,
            &options.use_cols,
            tagger.as_ref().map(TagInjector::column_name),
        )?;
        Ok(Merger {
            locator: options.locator,
            extractor,
            tagger,
        })
    }

    /// Locates the target sheet of one workbook and extracts its rows.
    pub fn process_workbook(&self, source: &Source) -> Result<ExtractedTable, SkipReason> {
        let unreadable = |error: MergerError| SkipReason::UnreadableWorkbook(error.to_string());
        let mut spreadsheet = source.open().map_err(unreadable)?;
        let sheet_name = self
            .locator
            .locate(&spreadsheet.sheet_names())
            .ok_or_else(|| SkipReason::SheetNotFound(self.locator.to_string()))?;
        let sheet = spreadsheet
            .read_sheet(&sheet_name, Some(self.extractor.window()))
            .map_err(unreadable)?;
        let label = self.tagger.as_ref().map(|tagger| tagger.derive_label(source.name()));
        self.extractor.extract(&sheet, label.as_deref())
    }

    /// Processes every source in order and merges what they yield.
    pub fn run(&self, sources: &[Source]) -> Result<MergeReport, MergerError> {
        let mut tables = Vec::new();
        let mut warnings = Vec::new();
        let mut total_rows = 0usize;
        for source in sources {
            info!(file = source.name(), "Processing");
            match self.process_workbook(source) {
                Ok(table) => {
                    total_rows += table.len();
                    info!(file = source.name(), rows = table.len(), total_rows, "Rows added");
                    tables.push(table);
                }
                Err(reason) => {
                    let warning = FileWarning {
                        file_name: source.name().to_owned(),
                        reason,
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        let files_merged = tables.len();
        let table = merge(tables)?;
        Ok(MergeReport {
            table,
            files_seen: sources.len(),
            files_merged,
            warnings,
        })
    }
}
