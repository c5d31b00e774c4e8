//! Two-phase merge: trimmed mirror files first, then the merge over the mirrors.

use crate::error::MergerError;
use crate::error::ResultMessage;
use crate::pipeline::sink::write_cell;
use crate::pipeline::sink::CellFormats;
use crate::pipeline::source::Source;
use crate::pipeline::FileWarning;
use crate::pipeline::MergeOptions;
use crate::pipeline::MergeReport;
use crate::pipeline::Merger;
use crate::pipeline::SkipReason;
use crate::spreadsheet::Spreadsheet;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use tracing::warn;

/// Writes `cleaned_dir/<source name>` holding every sheet of the source with its first
/// `rows_to_skip` rows removed. Columns, blank rows and duplicates are left alone.
pub fn write_mirror(source: &Source, cleaned_dir: &Path, rows_to_skip: usize) -> Result<PathBuf, MergerError> {
    let mut spreadsheet = source.open()?;
    let formats = CellFormats::default();
    let mut workbook = Workbook::new();
    for sheet_name in spreadsheet.sheet_names() {
        let sheet = spreadsheet.read_sheet(&sheet_name, None)?;
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;
        for (row, values) in sheet.rows_from(rows_to_skip).iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                write_cell(worksheet, row, col, value, &formats)?;
            }
        }
    }

    let path = cleaned_dir.join(source.name());
    workbook
        .save(&path)
        .map_err(MergerError::from)
        .with_prefix(&path.display().to_string())?;
    Ok(path)
}

/// Phase 1: mirrors every source into `cleaned_dir`. Unreadable sources are skipped with a warning.
pub fn mirror_all(
    sources: &[Source],
    cleaned_dir: &Path,
    rows_to_skip: usize,
) -> Result<(Vec<Source>, Vec<FileWarning>), MergerError> {
    std::fs::create_dir_all(cleaned_dir)
        .map_err(MergerError::from)
        .with_prefix(&cleaned_dir.display().to_string())?;

    let mut mirrors = Vec::with_capacity(sources.len());
    let mut warnings = Vec::new();
    for (index, source) in sources.iter().enumerate() {
        match write_mirror(source, cleaned_dir, rows_to_skip) {
            Ok(path) => {
                info!(file = source.name(), progress = %format!("{}/{}", index + 1, sources.len()), "Cleaned");
                mirrors.push(Source::from_path(path));
            }
            Err(error) => {
                let warning = FileWarning {
                    file_name: source.name().to_owned(),
                    reason: SkipReason::UnreadableWorkbook(error.to_string()),
                };
                warn!("{warning}");
                warnings.push(warning);
            }
        }
    }
    Ok((mirrors, warnings))
}

/// Runs both phases. Phase 2 reads the mirrors with no row skip, since phase 1 already trimmed them.
pub fn merge_with_mirror(
    options: &MergeOptions,
    sources: &[Source],
    cleaned_dir: &Path,
) -> Result<MergeReport, MergerError> {
    info!(dir = %cleaned_dir.display(), "Step 1: cleaning workbooks");
    let (mirrors, mut warnings) = mirror_all(sources, cleaned_dir, options.rows_to_skip)?;

    info!("Step 2: merging cleaned workbooks");
    let merger = Merger::new(MergeOptions {
        rows_to_skip: 0,
        ..options.clone()
    })?;
    let mut report = merger.run(&mirrors)?;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    report.files_seen = sources.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellValue;

    fn source() -> Source {
        let mut workbook = Workbook::new();
        for name in ["Cover", "Draft Roll Control Chart"] {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).unwrap();
            for row in 0..12u32 {
                worksheet.write_number(row, 1, f64::from(row)).unwrap();
            }
        }
        Source::from_bytes("Aamalva-Format-A1.xlsx", workbook.save_to_buffer().unwrap())
    }

    #[test]
    fn mirror_trims_every_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mirror(&source(), dir.path(), 10).unwrap();
        assert_eq!(path, dir.path().join("Aamalva-Format-A1.xlsx"));

        let mut mirror = Source::from_path(path).open().unwrap();
        assert_eq!(mirror.sheet_names(), vec!["Cover", "Draft Roll Control Chart"]);
        for name in mirror.sheet_names() {
            let rows = mirror.read_sheet(&name, None).unwrap().rows_from(0);
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0][1], CellValue::Number(10.0));
        }
    }

    #[test]
    fn unreadable_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = Source::from_bytes("broken.xlsx", b"garbage".to_vec());
        let (mirrors, warnings) = mirror_all(&[broken, source()], dir.path(), 10).unwrap();
        assert_eq!(mirrors.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].file_name, "broken.xlsx");
    }
}
