//! # Spreadsheet Decoding Module
//!
//! Turns the raw bytes of an uploaded file into a [`Grid`] taken from its first
//! sheet. Excel 2007+ workbooks (`.xlsx`, `.xlsm`) are read from their ZIP/XML
//! parts; delimited text (`.csv`, `.txt`, `.tsv`) is read field by field. The
//! decoder is chosen from the file extension alone.
use crate::error::BoardError;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod cell;
pub mod grid;
pub(crate) mod delimited;
pub(crate) mod reference;
pub(crate) mod xlsx;

pub use cell::Cell;
pub use grid::Grid;

/// Errors raised while decoding an upload into a grid.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format for '{0}'")]
    UnsupportedFormat(String),

    #[error("Missing '{0}' in workbook")]
    FileError(String),

    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Missing shared string {0}")]
    SharedStringMissing(usize),

    #[error("Invalid cell reference '{0}'")]
    InvalidReference(String),
}

/// Source formats accepted at the upload boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Excel 2007+ workbook (.xlsx, .xlsm)
    Xlsx,
    /// Comma-delimited text (.csv, .txt)
    Csv,
    /// Tab-delimited text (.tsv)
    Tsv,
}

impl Format {
    /// Detects the format from the file extension (case-insensitive).
    pub fn detect(file_name: &str) -> Result<Self, SpreadsheetError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(Format::Xlsx),
            Some("csv") | Some("txt") => Ok(Format::Csv),
            Some("tsv") => Ok(Format::Tsv),
            _ => Err(SpreadsheetError::UnsupportedFormat(file_name.to_owned())),
        }
    }
}

/// Decodes the first sheet of an uploaded file.
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<Grid, BoardError> {
    match Format::detect(file_name)? {
        Format::Xlsx => {
            let mut workbook = xlsx::XlsxWorkbook::open(file_name, bytes)?;
            let sheet_names = workbook.sheet_names();
            debug!(file_name, sheet = sheet_names[0], sheet_count = sheet_names.len(), "Decoding first worksheet");
            workbook.first_sheet()
        }
        Format::Csv => delimited::read_delimited(bytes, b','),
        Format::Tsv => delimited::read_delimited(bytes, b'\t'),
    }
}
