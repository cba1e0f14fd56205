use crate::board::labels::find_day_anchor;
use crate::board::labels::MetricRow;
use crate::board::labels::ModuleKey;
use crate::board::labels::DAY_COUNT;
use crate::board::number::parse_number;
use crate::spreadsheet::Cell;
use crate::spreadsheet::Grid;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::borrow::Cow;
use tracing::debug;
use tracing::trace;

/// Day-indexed series collected for one module section.
/// A metric row that never appeared leaves its series empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModuleBundle {
    /// Day labels as found in the sheet, in column order
    pub days: Vec<String>,
    pub input: Vec<f64>,
    pub output: Vec<f64>,
    /// Accumulated gap as reported by the sheet
    pub gap: Vec<f64>,
    pub wip: Vec<f64>,
}

impl ModuleBundle {
    /// True when any of input, output or gap was captured.
    pub fn has_series(&self) -> bool {
        !self.input.is_empty() || !self.output.is_empty() || !self.gap.is_empty()
    }

    fn set(&mut self, metric: MetricRow, series: Vec<f64>) {
        match metric {
            MetricRow::DailyActualInput => self.input = series,
            MetricRow::ActualOutput => self.output = series,
            MetricRow::AccumulateGap => self.gap = series,
            MetricRow::Wip => self.wip = series,
        }
    }
}

/// Module bundles of a board sheet, in the order their sections were discovered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Board {
    modules: Vec<(ModuleKey, ModuleBundle)>,
}

impl Board {
    pub fn get(&self, key: ModuleKey) -> Option<&ModuleBundle> {
        self.modules
            .iter()
            .find(|(module, _)| *module == key)
            .map(|(_, bundle)| bundle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleKey, &ModuleBundle)> {
        self.modules.iter().map(|(key, bundle)| (*key, bundle))
    }

    pub fn keys(&self) -> impl Iterator<Item = ModuleKey> + '_ {
        self.modules.iter().map(|(key, _)| *key)
    }

    /// First module discovered in the sheet.
    pub fn first_key(&self) -> Option<ModuleKey> {
        self.keys().next()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn entry(&mut self, key: ModuleKey) -> &mut ModuleBundle {
        let index = match self.modules.iter().position(|(module, _)| *module == key) {
            Some(index) => index,
            None => {
                self.modules.push((key, ModuleBundle::default()));
                self.modules.len() - 1
            }
        };
        &mut self.modules[index].1
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for (key, bundle) in &self.modules {
            map.serialize_entry(key.label(), bundle)?;
        }
        map.end()
    }
}

/// Scans a grid for the board layout: module section headers, a day-anchor row
/// fixing the seven day columns, and labelled metric rows beneath it.
///
/// Returns `None` when no module ends up with an input, output or gap series,
/// meaning the grid is not a board sheet.
pub fn extract_board(grid: &Grid) -> Option<Board> {
    let mut board = Board::default();
    let mut current_module: Option<ModuleKey> = None;
    let mut day_anchor: Option<usize> = None;

    for (index, row) in grid.rows().iter().enumerate() {
        let first = row.first().map(Cell::text).unwrap_or_default();

        if let Some(key) = ModuleKey::match_header(&first) {
            trace!(row = index, module = %key, "Module section header");
            board.entry(key);
            current_module = Some(key);
            continue;
        }

        let texts: Vec<Cow<str>> = row.iter().map(Cell::text).collect();
        if let Some(start) = find_day_anchor(&texts) {
            trace!(row = index, column = start, "Day anchor row");
            day_anchor = Some(start);
            if let Some(key) = current_module {
                board.entry(key).days = texts[start..start + DAY_COUNT]
                    .iter()
                    .map(|label| label.to_string())
                    .collect();
            }
            continue;
        }

        // Metric rows ahead of any anchor cannot be aligned and are dropped
        let (Some(key), Some(start), Some(metric)) = (current_module, day_anchor, MetricRow::parse(&first)) else {
            continue;
        };
        let series = (start..start + DAY_COUNT)
            .map(|col| parse_number(row.get(col)))
            .collect();
        board.entry(key).set(metric, series);
    }

    if board.iter().any(|(_, bundle)| bundle.has_series()) {
        debug!(modules = board.len(), "Board layout detected");
        Some(board)
    } else {
        debug!(sections = board.len(), "No board layout detected");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    fn row(first: &str, pad: usize, values: &[&str]) -> Vec<String> {
        let mut row = vec![first.to_owned()];
        row.extend(std::iter::repeat(String::new()).take(pad));
        row.extend(values.iter().map(|value| value.to_string()));
        row
    }

    fn day_row(pad: usize) -> Vec<String> {
        row("", pad, &WEEK)
    }

    fn tosa_grid() -> Grid {
        Grid::from(vec![
            row("TOSA Level", 0, &[]),
            day_row(1),
            row("Daily Actual Input", 1, &["710", "998", "1,000", "1047", "0", "0", "0"]),
            row("Actual Output", 1, &["914", "1,363", "990", "817", "-", "", "0"]),
        ])
    }

    #[test]
    fn extracts_module_series() {
        let board = extract_board(&tosa_grid()).unwrap();
        let tosa = board.get(ModuleKey::TosaLevel).unwrap();

        assert_eq!(tosa.days, WEEK);
        assert_eq!(tosa.input, vec![710.0, 998.0, 1000.0, 1047.0, 0.0, 0.0, 0.0]);
        assert_eq!(tosa.output, vec![914.0, 1363.0, 990.0, 817.0, 0.0, 0.0, 0.0]);
        assert!(tosa.gap.is_empty());
        assert!(tosa.wip.is_empty());
    }

    #[test]
    fn short_metric_rows_read_missing_days_as_zero() {
        let grid = Grid::from(vec![
            row("FG Level", 0, &[]),
            day_row(0),
            row("WIP", 0, &["5", "6"]),
            row("Accumulate gap", 0, &["(3)"]),
        ]);
        let board = extract_board(&grid).unwrap();
        let fg = board.get(ModuleKey::FgLevel).unwrap();
        assert_eq!(fg.wip, vec![5.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(fg.gap, vec![-3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn metric_row_before_anchor_is_skipped() {
        let grid = Grid::from(vec![
            row("TOSA Level", 0, &[]),
            row("Daily Actual Input", 0, &["1", "2", "3", "4", "5", "6", "7"]),
            day_row(0),
            row("Actual Output", 0, &["7", "6", "5", "4", "3", "2", "1"]),
        ]);
        let board = extract_board(&grid).unwrap();
        let tosa = board.get(ModuleKey::TosaLevel).unwrap();
        assert!(tosa.input.is_empty());
        assert_eq!(tosa.output[0], 7.0);
    }

    #[test]
    fn metric_row_without_module_is_skipped() {
        let grid = Grid::from(vec![
            day_row(0),
            row("Daily Actual Input", 0, &["1", "2", "3", "4", "5", "6", "7"]),
        ]);
        assert_eq!(extract_board(&grid), None);
    }

    #[test]
    fn anchor_carries_across_module_sections() {
        let grid = Grid::from(vec![
            row("TOSA Level", 0, &[]),
            day_row(2),
            row("Daily Actual Input", 2, &["1", "1", "1", "1", "1", "1", "1"]),
            row("Module PCBA Assy", 0, &[]),
            row("Daily Actual Input", 2, &["2", "2", "2", "2", "2", "2", "2"]),
        ]);
        let board = extract_board(&grid).unwrap();
        let pcba = board.get(ModuleKey::PcbaAssy).unwrap();
        assert_eq!(pcba.input, vec![2.0; 7]);
        assert!(pcba.days.is_empty());
        assert_eq!(board.keys().collect::<Vec<_>>(), vec![ModuleKey::TosaLevel, ModuleKey::PcbaAssy]);
    }

    #[test]
    fn repeated_header_accumulates_into_same_bundle() {
        let grid = Grid::from(vec![
            row("Module internal", 0, &[]),
            day_row(0),
            row("Daily Actual Input", 0, &["1", "1", "1", "1", "1", "1", "1"]),
            row("Actual Output", 0, &["2", "2", "2", "2", "2", "2", "2"]),
            row("Module internal (cont.)", 0, &[]),
            row("Actual Output", 0, &["3", "3", "3", "3", "3", "3", "3"]),
        ]);
        let board = extract_board(&grid).unwrap();
        assert_eq!(board.len(), 1);
        let internal = board.get(ModuleKey::Internal).unwrap();
        assert_eq!(internal.input, vec![1.0; 7]);
        assert_eq!(internal.output, vec![3.0; 7]);
        assert_eq!(internal.days, WEEK);
    }

    #[test]
    fn stored_day_labels_are_trimmed_grid_text() {
        let grid = Grid::from(vec![
            vec!["TOSA Level", "", "", "", "", "", ""],
            vec![" Mon", "Tue ", "Wed", "Thu", "Fri", "Sat", "Sun"],
            vec!["Actual Output", "1", "2", "3", "4", "5", "6", "7"],
        ]);
        let board = extract_board(&grid).unwrap();
        let tosa = board.get(ModuleKey::TosaLevel).unwrap();
        assert_eq!(tosa.days, WEEK);
        // the label column doubles as Monday when the anchor sits at column 0
        assert_eq!(tosa.output, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn wip_only_sections_are_not_a_board() {
        let grid = Grid::from(vec![
            row("TOSA Level", 0, &[]),
            day_row(0),
            row("WIP", 0, &["1", "1", "1", "1", "1", "1", "1"]),
        ]);
        assert_eq!(extract_board(&grid), None);
    }

    #[test]
    fn tall_rows_are_not_a_board() {
        let grid = Grid::from(vec![
            vec!["name", "input", "output", "gap"],
            vec!["Mon", "10", "8", "2"],
            vec!["Tue", "12", "9", "3"],
        ]);
        assert_eq!(extract_board(&grid), None);
        assert_eq!(extract_board(&Grid::default()), None);
    }

    #[test]
    fn unrelated_rows_are_ignored() {
        let mut grid = tosa_grid().rows().to_vec();
        grid.insert(2, vec![Cell::from("Remark: line 3 down on Tue")]);
        grid.insert(3, vec![]);
        grid.push(vec![Cell::from("Total"), Cell::from("5,000")]);
        let board = extract_board(&Grid::new(grid)).unwrap();
        assert_eq!(board.get(ModuleKey::TosaLevel).unwrap().input[3], 1047.0);
    }

    #[test]
    fn typed_number_cells_are_read() {
        let grid = Grid::new(vec![
            vec![Cell::from("FG Level")],
            std::iter::once(Cell::Empty).chain(WEEK.iter().map(|day| Cell::from(*day))).collect(),
            vec![Cell::from("Daily Actual Input"), Cell::Number(500.0), Cell::Number(480.5)],
        ]);
        let board = extract_board(&grid).unwrap();
        assert_eq!(board.get(ModuleKey::FgLevel).unwrap().input[..2], [500.0, 480.5]);
    }

    #[test]
    fn serialises_modules_by_label_in_discovery_order() {
        let board = extract_board(&tosa_grid()).unwrap();
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["TOSA Level"]["input"][0], 710.0);
        assert_eq!(json["TOSA Level"]["days"][6], "Sun");
    }
}
