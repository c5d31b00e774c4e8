use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::range::Range;

/// A worksheet read from a workbook: sparse cells at absolute positions counted from A1.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Source file name
    pub file_name: String,
    /// Sheet name
    pub name: String,
    /// Non-empty cells in document order
    pub(crate) cells: Vec<Cell>,
    /// Cells outside this range are dropped while reading
    range: Range,
    row_upper_bound: Option<usize>,
    col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet; `range` limits which cells are kept.
    pub(crate) fn new(file_name: &str, name: &str, range: Option<Range>) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            range: range.unwrap_or_default(),
            row_upper_bound: None,
            col_upper_bound: None,
        }
    }

    /// Builds a sheet from a dense grid; blank cells are not stored.
    pub fn from_rows(file_name: &str, name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Sheet::new(file_name, name, None);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if value != CellValue::Empty {
                    sheet.push(Cell { row, col, value });
                }
            }
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows from A1 through the last row holding a cell.
    pub fn height(&self) -> usize {
        self.row_upper_bound.map_or(0, |row| row + 1)
    }

    /// Number of columns from A through the last column holding a cell.
    pub fn width(&self) -> usize {
        self.col_upper_bound.map_or(0, |col| col + 1)
    }

    /// Checks if a cell at (row, col) is kept by the reading range.
    pub(crate) fn contains(&self, row: usize, col: usize) -> bool {
        self.range.contains(row, col)
    }

    /// Checks if reading can stop: every remaining row is past the range.
    pub(crate) fn after_row_upper_bound(&self, row: usize) -> bool {
        self.range.row_upper_bound.is_some_and(|bound| bound < row)
    }

    /// Adds a cell, updating the used area.
    pub(crate) fn push(&mut self, cell: Cell) {
        if self.row_upper_bound.map_or(true, |bound| bound < cell.row) {
            self.row_upper_bound = Some(cell.row);
        }
        if self.col_upper_bound.map_or(true, |bound| bound < cell.col) {
            self.col_upper_bound = Some(cell.col);
        }
        self.cells.push(cell);
    }

    /// Materializes rows `[row_lower, height)` over the inclusive column span `[col_lower, col_upper]`.
    /// Positions without a cell are `CellValue::Empty`.
    pub fn grid(&self, row_lower: usize, col_lower: usize, col_upper: usize) -> Vec<Vec<CellValue>> {
        let height = self.height().saturating_sub(row_lower);
        let width = (col_upper + 1).saturating_sub(col_lower);
        let mut grid = vec![vec![CellValue::Empty; width]; height];
        for cell in &self.cells {
            if cell.row >= row_lower && (col_lower..=col_upper).contains(&cell.col) {
                grid[cell.row - row_lower][cell.col - col_lower] = cell.value.clone();
            }
        }
        grid
    }

    /// All rows over every used column, starting at `row_lower`.
    pub fn rows_from(&self, row_lower: usize) -> Vec<Vec<CellValue>> {
        match self.width() {
            0 => Vec::new(),
            width => self.grid(row_lower, 0, width - 1),
        }
    }
}
