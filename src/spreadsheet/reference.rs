//! Conversions between Excel-style cell references ("B3") and 0-based indexes.

/// Rows in an Excel 2007+ worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Columns in an Excel 2007+ worksheet (`A` to `XFD`).
pub(crate) const MAX_COLS: usize = 16_384;

/// True when a 0-based position lies inside the worksheet limits.
pub(crate) fn in_sheet_bounds(row: usize, col: usize) -> bool {
    row < MAX_ROWS && col < MAX_COLS
}

/// Converts column letters ("A", "AB") to a 0-based column index.
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
        if index > MAX_COLS {
            return None;
        }
    }
    Some(index - 1)
}

/// Converts a 1-based row number ("3") to a 0-based row index.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    match digits.parse::<usize>().ok()? {
        number @ 1..=MAX_ROWS => Some(number - 1),
        _ => None,
    }
}

/// Parses a cell reference into `(row, col)`, both 0-based.
/// Absolute markers (`$B$3`) are accepted.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Formats 0-based `(row, col)` as an Excel-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = String::new();
    let mut col = col + 1;
    while col > 0 {
        col -= 1;
        letters.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }
    format!("{}{}", letters, row + 1)
}
