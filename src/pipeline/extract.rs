use crate::conf::COLUMN_LABELS;
use crate::conf::N_WINDOW_COLS;
use crate::error::MergerError;
use crate::pipeline::SkipReason;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::range::RangeError;
use crate::spreadsheet::sheet::Sheet;
use std::fmt::Display;
use tracing::debug;

/// Column labels of an extracted or merged table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    /// Name of the leading tag column, if rows are tagged
    tag_column: Option<String>,
}

impl Schema {
    pub fn new(tag_column: Option<&str>) -> Self {
        Schema {
            tag_column: tag_column.map(str::to_owned),
        }
    }

    pub fn tag_column(&self) -> Option<&str> {
        self.tag_column.as_deref()
    }

    /// Header row: the tag column (if any) followed by `B C D E F`.
    pub fn labels(&self) -> Vec<String> {
        self.tag_column
            .iter()
            .cloned()
            .chain(COLUMN_LABELS.iter().map(|label| label.to_string()))
            .collect()
    }

    pub fn width(&self) -> usize {
        N_WINDOW_COLS + usize::from(self.tag_column.is_some())
    }
}

/// One retained source row: an optional tag plus the five window cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub tag: Option<String>,
    pub values: [CellValue; N_WINDOW_COLS],
}

impl Row {
    /// True when every window cell is blank; the tag is not considered.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_blank)
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "[{tag}] ")?;
        }
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Rows extracted from one source workbook.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedTable {
    /// File name of the source workbook
    pub source_name: String,
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl ExtractedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cuts the header block and the column window out of a sheet.
#[derive(Clone, Debug)]
pub struct Extractor {
    rows_to_skip: usize,
    window: Range,
    col_lower: usize,
    col_upper: usize,
    schema: Schema,
}

impl Extractor {
    /// `use_cols` must name a closed span of exactly five columns, e.g. `"B:F"`.
    pub fn new(rows_to_skip: usize, use_cols: &str, tag_column: Option<&str>) -> Result<Self, MergerError> {
        let range = Range::try_from(use_cols)?;
        let (col_lower, col_upper) = range
            .columns()
            .ok_or_else(|| RangeError::OpenColumnBound(use_cols.to_owned()))?;
        let width = (col_upper + 1).saturating_sub(col_lower);
        if width != N_WINDOW_COLS {
            Err(RangeError::FormatError(format!(
                "{use_cols} spans {width} columns, {N_WINDOW_COLS} expected"
            )))?
        }
        Ok(Extractor {
            rows_to_skip,
            window: Range {
                col_lower_bound: Some(col_lower),
                col_upper_bound: Some(col_upper),
                ..Range::default()
            },
            col_lower,
            col_upper,
            schema: Schema::new(tag_column),
        })
    }

    /// Column-only range to read sheets with; row trimming happens in [`Extractor::extract`].
    pub fn window(&self) -> Range {
        self.window
    }

    /// Drops the first `rows_to_skip` rows, keeps the window and removes rows blank in all five cells.
    /// `tag` is attached to every row when the schema has a tag column.
    pub fn extract(&self, sheet: &Sheet, tag: Option<&str>) -> Result<ExtractedTable, SkipReason> {
        let tag = self.schema.tag_column().and(tag);
        let rows: Vec<Row> = sheet
            .grid(self.rows_to_skip, self.col_lower, self.col_upper)
            .into_iter()
            .map(|cells| Row {
                tag: tag.map(str::to_owned),
                values: std::array::from_fn(|index| cells.get(index).cloned().unwrap_or_default()),
            })
            .filter(|row| !row.is_blank())
            .collect();
        if rows.is_empty() {
            return Err(SkipReason::EmptyAfterFilter);
        }
        for row in &rows {
            debug!(source = %sheet.file_name, cells = %row, "Row retained");
        }
        Ok(ExtractedTable {
            source_name: sheet.file_name.to_owned(),
            schema: self.schema.clone(),
            rows,
        })
    }
}
