use crate::conf::LOCK_FILE_PREFIX;
use crate::conf::SOURCE_EXTENSION;
use crate::error::MergerError;
use crate::error::ResultMessage;
use crate::pipeline::PipelineError;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use glob::GlobError;
use glob::MatchOptions;
use glob::Pattern;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the bytes of a source workbook live.
#[derive(Clone, Debug)]
pub enum SourceData {
    /// File on disk, opened on every read
    Path(PathBuf),
    /// Uploaded content, shared between reads
    Bytes(Arc<[u8]>),
}

/// A named workbook to merge.
#[derive(Clone, Debug)]
pub struct Source {
    name: String,
    data: SourceData,
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Source {
            name,
            data: SourceData::Path(path),
        }
    }

    pub fn from_bytes(name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        Source {
            name: name.to_owned(),
            data: SourceData::Bytes(bytes.into()),
        }
    }

    /// File name without directories
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opens the workbook; every call starts from the first byte.
    pub fn open(&self) -> Result<XlsxSpreadsheet, MergerError> {
        match &self.data {
            SourceData::Path(path) => XlsxSpreadsheet::open(path),
            SourceData::Bytes(bytes) => XlsxSpreadsheet::from_bytes(&self.name, bytes.clone()),
        }
    }
}

/// Reads the given files fully into memory, in the given order.
pub fn read_files(paths: &[PathBuf]) -> Result<Vec<Source>, MergerError> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .map_err(MergerError::from)
                .with_prefix(&path.display().to_string())?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            Ok(Source::from_bytes(&name, bytes))
        })
        .collect()
}

/// Lists `*.xlsx` files (any case) directly inside `dir`, skipping `~$` lock files.
/// Paths come back sorted.
pub fn scan_directory(dir: &Path) -> Result<Vec<Source>, MergerError> {
    if !dir.is_dir() {
        Err(PipelineError::MissingInputLocation(dir.to_path_buf()))?
    }

    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        SOURCE_EXTENSION
    );
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let mut paths = glob::glob_with(&pattern, options)?
        .map(|entry| entry.map_err(GlobError::into_error))
        .collect::<Result<Vec<PathBuf>, std::io::Error>>()?;
    paths.retain(|path| {
        path.is_file()
            && path
                .file_name()
                .is_some_and(|name| !name.to_string_lossy().starts_with(LOCK_FILE_PREFIX))
    });
    paths.sort();

    if paths.is_empty() {
        Err(PipelineError::NoInputFiles(dir.to_path_buf()))?
    }
    Ok(paths.into_iter().map(Source::from_path).collect())
}
