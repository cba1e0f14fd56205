//! # Board Extraction Module
//!
//! Interprets a decoded [`Grid`] as production data. Two layouts are understood:
//!
//! - **Board sheets**: module sections (`TOSA Level`, `Module PCBA Assy`, ...) each
//!   followed by a `Mon..Sun` day row and labelled metric rows
//!   (`Daily Actual Input`, `Actual Output`, `Accumulate gap`, `WIP`).
//! - **Tall tables**: a header row naming `name`/`day`, `input`, `output`, `gap`
//!   columns with one record per following row.
//!
//! The board layout is tried first; the tall-table reading is the fallback.
use crate::spreadsheet::Grid;
use serde::Serialize;
use tracing::debug;

pub mod extract;
pub mod flat;
pub mod labels;
pub mod number;

pub use extract::extract_board;
pub use extract::Board;
pub use extract::ModuleBundle;
pub use flat::extract_flat;
pub use flat::FlatRecord;
pub use labels::MetricRow;
pub use labels::ModuleKey;
pub use labels::DAY_LABELS;
pub use number::parse_number;

/// Outcome of interpreting one uploaded grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExtractionResult {
    /// Per-module day series from a board sheet
    Board { modules: Board },
    /// Tall-table records, possibly none
    Flat { records: Vec<FlatRecord> },
    /// The sheet had no rows at all
    Empty,
}

impl ExtractionResult {
    pub fn board(&self) -> Option<&Board> {
        match self {
            ExtractionResult::Board { modules } => Some(modules),
            _ => None,
        }
    }
}

/// Extracts board bundles when the layout is recognised, tall records otherwise.
pub fn extract_grid(grid: &Grid) -> ExtractionResult {
    if grid.is_empty() {
        return ExtractionResult::Empty;
    }
    match extract_board(grid) {
        Some(modules) => ExtractionResult::Board { modules },
        None => {
            let records = extract_flat(grid);
            debug!(records = records.len(), "Falling back to tall rows");
            ExtractionResult::Flat { records }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_layout_takes_precedence() {
        let grid = Grid::from(vec![
            vec!["FG Level"],
            vec!["name", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            vec!["Actual Output", "1", "2", "3", "4", "5", "6", "7"],
        ]);
        let result = extract_grid(&grid);
        let board = result.board().unwrap();
        assert_eq!(board.first_key(), Some(ModuleKey::FgLevel));
    }

    #[test]
    fn tall_table_is_read_as_flat_records() {
        let grid = Grid::from(vec![
            vec!["name", "input", "output", "gap"],
            vec!["Mon", "10", "8", "2"],
            vec!["Tue", "12", "9", "3"],
        ]);
        match extract_grid(&grid) {
            ExtractionResult::Flat { records } => assert_eq!(records.len(), 2),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn unrecognised_sheet_is_flat_not_empty() {
        let grid = Grid::from(vec![vec!["Shift roster"]]);
        assert_eq!(extract_grid(&grid), ExtractionResult::Flat { records: vec![] });
        assert_eq!(extract_grid(&Grid::default()), ExtractionResult::Empty);
    }

    #[test]
    fn extraction_is_repeatable() {
        let grid = Grid::from(vec![
            vec!["TOSA Level"],
            vec!["", "", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            vec!["Daily Actual Input", "", "710", "998", "1000", "1047", "0", "0", "0"],
        ]);
        assert_eq!(extract_grid(&grid), extract_grid(&grid));
    }

    #[test]
    fn serialises_with_kind_tag() {
        let empty = serde_json::to_value(ExtractionResult::Empty).unwrap();
        assert_eq!(empty, serde_json::json!({ "kind": "empty" }));

        let flat = ExtractionResult::Flat {
            records: vec![FlatRecord::new("Mon", 1.0, 2.0, -1.0)],
        };
        let flat = serde_json::to_value(flat).unwrap();
        assert_eq!(flat["kind"], "flat");
        assert_eq!(flat["records"][0]["name"], "Mon");
    }
}
