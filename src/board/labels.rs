//! Fixed label sets recognised on a production board sheet.
use serde::Serialize;
use std::fmt::Display;

/// Canonical day labels of a day-anchor row, in column order.
pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Number of day columns read from a metric row.
pub const DAY_COUNT: usize = DAY_LABELS.len();

/// Production modules reported on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModuleKey {
    #[serde(rename = "TOSA Level")]
    TosaLevel,
    #[serde(rename = "Module PCBA Assy")]
    PcbaAssy,
    #[serde(rename = "Module internal")]
    Internal,
    #[serde(rename = "FG Level")]
    FgLevel,
}

impl ModuleKey {
    pub const ALL: [ModuleKey; 4] = [
        ModuleKey::TosaLevel,
        ModuleKey::PcbaAssy,
        ModuleKey::Internal,
        ModuleKey::FgLevel,
    ];

    /// Section header label as written in the sheet.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TosaLevel => "TOSA Level",
            Self::PcbaAssy => "Module PCBA Assy",
            Self::Internal => "Module internal",
            Self::FgLevel => "FG Level",
        }
    }

    /// Panel title shown for the module.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::TosaLevel => "TOSA Module",
            Self::PcbaAssy => "PCBA Assy Module",
            Self::Internal => "Internal Module",
            Self::FgLevel => "FG Level Module",
        }
    }

    /// Matches a section header by label prefix; headers may carry trailing qualifiers
    /// such as `"TOSA Level (WK6)"`. The first key in declaration order wins.
    pub fn match_header(first_cell: &str) -> Option<Self> {
        let first_cell = first_cell.trim();
        Self::ALL.into_iter().find(|key| first_cell.starts_with(key.label()))
    }
}

impl Display for ModuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Labelled rows carrying a day series inside a module section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MetricRow {
    DailyActualInput,
    ActualOutput,
    AccumulateGap,
    Wip,
}

impl MetricRow {
    pub const ALL: [MetricRow; 4] = [
        MetricRow::DailyActualInput,
        MetricRow::ActualOutput,
        MetricRow::AccumulateGap,
        MetricRow::Wip,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::DailyActualInput => "Daily Actual Input",
            Self::ActualOutput => "Actual Output",
            Self::AccumulateGap => "Accumulate gap",
            Self::Wip => "WIP",
        }
    }

    /// Exact match on the trimmed first cell.
    pub fn parse(first_cell: &str) -> Option<Self> {
        let first_cell = first_cell.trim();
        Self::ALL.into_iter().find(|row| row.label() == first_cell)
    }
}

/// Finds the first column where the seven canonical day labels start, in order and contiguous.
/// Cells are compared after trimming, case-sensitively.
pub fn find_day_anchor<S: AsRef<str>>(cells: &[S]) -> Option<usize> {
    if cells.len() < DAY_COUNT {
        return None;
    }
    (0..=cells.len() - DAY_COUNT).find(|&start| {
        DAY_LABELS
            .iter()
            .zip(&cells[start..start + DAY_COUNT])
            .all(|(label, cell)| cell.as_ref().trim() == *label)
    })
}
