use crate::error::BoardError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::grid::Grid;
use crate::spreadsheet::grid::GridBuilder;
use csv::ReaderBuilder;

/// Decodes delimited text into a grid. Every field is kept as text; rows may differ in width.
pub(crate) fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Grid, BoardError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut grid = GridBuilder::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for (col, field) in record.iter().enumerate() {
            grid.push(row, col, Cell::from(field));
        }
    }
    Ok(grid.finish())
}
