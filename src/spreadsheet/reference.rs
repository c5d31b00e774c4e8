//! Conversions between A1-style references and 0-based indexes.

/// Converts column letters (`"A"`, `"F"`, `"AA"`) to a 0-based column index.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters.chars() {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = (letter.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a 1-based row number (`"1"`) to a 0-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number.parse::<usize>().ok().filter(|row| *row > 0).map(|row| row - 1)
}

/// Converts a 0-based column index to column letters.
pub(crate) fn index_to_col(col: usize) -> String {
    let mut letters = Vec::new();
    let mut remainder = col + 1;
    while remainder > 0 {
        remainder -= 1;
        letters.push((b'A' + (remainder % 26) as u8) as char);
        remainder /= 26;
    }
    letters.iter().rev().collect()
}

/// Converts 0-based (row, col) to an A1-style reference, e.g. (2, 1) -> "B3".
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

/// Parses an A1-style cell reference into 0-based (row, col).
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let col = col_to_index(letters)?;
    let row = row_to_index(digits)?;
    Some((row, col))
}
