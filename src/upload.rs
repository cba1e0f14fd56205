use crate::board::extract_grid;
use crate::board::ExtractionResult;
use crate::error::BoardError;
use crate::spreadsheet;
use thiserror::Error;
use tracing::info;
use tracing::warn;

/// Failure to turn an uploaded file into a result.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Could not read '{file_name}'. Check that the file has name, input, output, gap columns or follows the board template.")]
    Decode {
        file_name: String,
        #[source]
        source: BoardError,
    },
}

/// Decodes the first sheet of an uploaded file and extracts its production data.
/// Only decoding can fail; a sheet without recognisable content is a valid result.
pub fn process(file_name: &str, bytes: &[u8]) -> Result<ExtractionResult, UploadError> {
    let grid = match spreadsheet::decode(file_name, bytes) {
        Ok(grid) => grid,
        Err(source) => {
            warn!(file_name, error = %source, "Failed to decode upload");
            return Err(UploadError::Decode {
                file_name: file_name.to_string(),
                source,
            });
        }
    };
    let result = extract_grid(&grid);
    match &result {
        ExtractionResult::Board { modules } => {
            info!(file_name, rows = grid.len(), modules = modules.len(), "Board sheet uploaded")
        }
        ExtractionResult::Flat { records } => {
            info!(file_name, rows = grid.len(), records = records.len(), "Tall sheet uploaded")
        }
        ExtractionResult::Empty => info!(file_name, "Empty sheet uploaded"),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn decode_failures_carry_user_notice() {
        let error = process("week6.xlsx", b"not a zip").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Could not read 'week6.xlsx'. Check that the file has name, input, output, gap columns or follows the board template."
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn unsupported_extension_is_a_decode_failure() {
        let UploadError::Decode { source, .. } = process("board.ods", b"").unwrap_err();
        assert!(matches!(source, BoardError::SpreadsheetError(_)));
    }

    #[test]
    fn tall_csv_upload() {
        let result = process("rows.csv", b"name,input,output,gap\nMon,10,8,2\nTue,12,9,3\n").unwrap();
        assert!(matches!(result, ExtractionResult::Flat { ref records } if records.len() == 2));
    }

    #[test]
    fn blank_csv_is_empty() {
        assert_eq!(process("blank.csv", b"\n,,\n").unwrap(), ExtractionResult::Empty);
    }
}
