use crate::error::MergerError;
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::row_to_index;
use regex::Regex;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),

    #[error("Range '{0}' must name both a first and a last column")]
    OpenColumnBound(String),
}

/// Represents an Excel-style cell range with optional boundaries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Range {
    /// Lower row bound (0-based index), None for unbounded
    pub row_lower_bound: Option<usize>,
    /// Upper row bound (0-based index), None for unbounded
    pub row_upper_bound: Option<usize>,
    /// Lower column bound (0-based index), None for unbounded
    pub col_lower_bound: Option<usize>,
    /// Upper column bound (0-based index), None for unbounded
    pub col_upper_bound: Option<usize>,
}

impl Range {
    /// Checks if a cell at (row, col) falls inside the range.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row_lower_bound.map_or(true, |bound| bound <= row)
            && self.row_upper_bound.map_or(true, |bound| row <= bound)
            && self.col_lower_bound.map_or(true, |bound| bound <= col)
            && self.col_upper_bound.map_or(true, |bound| col <= bound)
    }

    /// Returns the inclusive column span, if both ends are bounded.
    pub fn columns(&self) -> Option<(usize, usize)> {
        self.col_lower_bound.zip(self.col_upper_bound)
    }
}

impl TryFrom<&str> for Range {
    type Error = MergerError;

    /// Parses an Excel-style range string (e.g., "A1", "B2:C5", "B:F", "1:10").
    /// Supports single cells, ranges, and partial ranges (columns or rows only).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern");
        let value = value.trim().to_ascii_uppercase();
        let captures = pattern
            .captures(value.as_str())
            .ok_or(RangeError::FormatError(value.to_owned()))?;
        let col_lower_bound = captures.get(1).map(|m| m.as_str()).and_then(col_to_index);
        let row_lower_bound = captures.get(2).map(|m| m.as_str()).and_then(row_to_index);
        // A single cell or column ("B", "B3") is bounded on both sides by itself
        let is_single = captures.get(3).is_none();
        Ok(Range {
            col_lower_bound,
            row_lower_bound,
            col_upper_bound: if is_single {
                col_lower_bound
            } else {
                captures.get(4).map(|m| m.as_str()).and_then(col_to_index)
            },
            row_upper_bound: if is_single {
                row_lower_bound
            } else {
                captures.get(5).map(|m| m.as_str()).and_then(row_to_index)
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_window() {
        let range = Range::try_from("B:F").unwrap();
        assert_eq!(range.columns(), Some((1, 5)));
        assert_eq!(range.row_lower_bound, None);
        assert_eq!(range.row_upper_bound, None);
        assert!(range.contains(1_000, 1));
        assert!(range.contains(0, 5));
        assert!(!range.contains(0, 0));
        assert!(!range.contains(0, 6));
    }

    #[test]
    fn cell_range() {
        let range = Range::try_from("b2:c5").unwrap();
        assert_eq!(range.row_lower_bound, Some(1));
        assert_eq!(range.row_upper_bound, Some(4));
        assert_eq!(range.columns(), Some((1, 2)));
    }

    #[test]
    fn single_column() {
        let range = Range::try_from("D").unwrap();
        assert_eq!(range.columns(), Some((3, 3)));
    }

    #[test]
    fn invalid_range() {
        assert!(Range::try_from("B-F").is_err());
        assert!(Range::try_from("1B").is_err());
    }
}
