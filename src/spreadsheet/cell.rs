use crate::conf::NA_STRINGS;
use crate::error::MergerError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::Timelike;
use std::fmt::Display;

/// Days between the 1900 and the 1904 date systems.
const DAYS_1904_OFFSET: f64 = 1_462.0;
/// Microseconds in one day.
const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Types of raw cell data in a worksheet part.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 1/0
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings (`t="d"`)
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error literals such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Literal text, escapes and bracketed sections (colors, conditions) are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A typed cell value. Date and time values are serials in the 1900 date system.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(f64),
    DateTime(f64),
    Time(f64),
    /// Excel error literal, e.g. `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// A cell is blank when it holds nothing, an error literal or one of [`NA_STRINGS`].
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty | CellValue::Error(_) => true,
            CellValue::Text(text) => NA_STRINGS.contains(&text.as_str()),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) | CellValue::Error(text) => write!(f, "{text}"),
            CellValue::Number(number) => write!(f, "{number}"),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "TRUE" } else { "FALSE" }),
            CellValue::Date(serial) => match serial_to_datetime(*serial) {
                Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d")),
                None => write!(f, "{serial}"),
            },
            CellValue::DateTime(serial) => match serial_to_datetime(*serial) {
                Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{serial}"),
            },
            CellValue::Time(serial) => match serial_to_datetime(*serial) {
                Some(datetime) => write!(f, "{}", datetime.format("%H:%M:%S")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

/// Represents a single decoded cell with its 0-based position.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Decoded value
    pub(crate) value: CellValue,
}

impl Cell {
    /// Decodes the raw `<v>`/`<is>` text of a cell according to its type.
    pub(crate) fn decode(
        row: usize,
        col: usize,
        kind: CellType,
        raw: &str,
        shared_strings: &[String],
    ) -> Result<Cell, MergerError> {
        let number = || -> Result<f64, MergerError> { Ok(raw.trim().parse::<f64>()?) };
        let value = match kind {
            CellType::Empty => CellValue::Empty,
            CellType::Boolean => CellValue::Boolean(raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true")),
            CellType::Number => CellValue::Number(number()?),
            CellType::NumberDate1900 => CellValue::Date(number()?),
            CellType::NumberDateTime1900 => CellValue::DateTime(number()?),
            CellType::NumberTime1900 => CellValue::Time(number()?),
            CellType::NumberDate1904 => CellValue::Date(number()? + DAYS_1904_OFFSET),
            CellType::NumberDateTime1904 => CellValue::DateTime(number()? + DAYS_1904_OFFSET),
            CellType::NumberTime1904 => CellValue::Time(number()?),
            CellType::IsoDateTime => parse_iso_datetime(raw).ok_or_else(|| {
                SpreadsheetError::CellValueError(
                    index_to_reference(row, col),
                    format!("parse '{raw}' to datetime failed"),
                )
            })?,
            CellType::InlineString => CellValue::Text(raw.to_owned()),
            CellType::SharedString => {
                let index = raw.trim().parse::<usize>()?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    SpreadsheetError::CellValueError(
                        index_to_reference(row, col),
                        format!("shared string {index} out of range"),
                    )
                })?;
                CellValue::Text(text.to_owned())
            }
            CellType::Error => CellValue::Error(raw.to_owned()),
        };
        Ok(Cell { row, col, value })
    }
}

/// The day before serial 1 in the 1900 date system.
fn epoch_1900() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("NaiveDate Literal")
}

/// Converts a 1900-system serial to a calendar date/time.
/// Serials below 60 are shifted by one day to honor the Lotus 1-2-3 leap year bug.
pub(crate) fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let micros = (serial.fract() * MICROS_PER_DAY).round() as i64;
    let days = if (1..60).contains(&days) { days + 1 } else { days };
    epoch_1900()
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::microseconds(micros))
}

/// Converts a calendar date/time to a 1900-system serial.
pub(crate) fn datetime_to_serial(datetime: NaiveDateTime) -> f64 {
    let elapsed = datetime - epoch_1900();
    let days = elapsed.num_days();
    let days = if days < 61 { days - 1 } else { days };
    let time = datetime.time();
    let micros = time.num_seconds_from_midnight() as f64 * 1_000_000.0 + (time.nanosecond() / 1_000) as f64;
    days as f64 + micros / MICROS_PER_DAY
}

/// Parses a `t="d"` ISO 8601 value into a typed date or date/time.
fn parse_iso_datetime(raw: &str) -> Option<CellValue> {
    let raw = raw.trim().trim_end_matches('Z');
    if raw.contains('T') {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|datetime| CellValue::DateTime(datetime_to_serial(datetime)))
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| CellValue::Date(datetime_to_serial(datetime)))
    }
}
