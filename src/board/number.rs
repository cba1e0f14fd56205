//! Fail-soft numeric reading of board cells.
//!
//! Board sheets are exported with display formatting, so numbers arrive as
//! `"1,234"`, `"(1,234)"` for negatives, or `"-"` for zero. Anything that cannot
//! be read as a finite number counts as 0; a bad cell never aborts its row.
use crate::spreadsheet::Cell;

/// Reads a cell as a finite number.
pub fn parse_number(cell: Option<&Cell>) -> f64 {
    match cell {
        None | Some(Cell::Empty) => 0.0,
        Some(Cell::Number(value)) => finite_or_zero(*value),
        Some(Cell::Text(text)) => parse_number_text(text),
    }
}

/// Reads display-formatted numeric text as a finite number.
pub fn parse_number_text(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return 0.0;
    }
    let (negate, text) = match text.strip_prefix('(').and_then(|inner| inner.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, text),
    };
    let digits = text.replace(',', "");
    let value = match digits.trim().parse::<f64>() {
        Ok(value) => finite_or_zero(value),
        Err(_) => 0.0,
    };
    let value = if negate { -value } else { value };
    // -0.0 from "(0)" or "()" reads as plain zero
    if value == 0.0 { 0.0 } else { value }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
