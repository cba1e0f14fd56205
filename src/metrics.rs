//! # Derived Metrics
//!
//! Pure functions turning extracted series into the figures shown on the
//! dashboard: totals, gap and WIP series, short-window trends, target status,
//! time-bucket aggregation and target scaling.
use crate::board::FlatRecord;
use crate::board::ModuleBundle;
use crate::config::MonitorMode;
use regex::Regex;
use serde::Serialize;

/// Status tolerance of module panel lines.
pub const ROW_TOLERANCE: f64 = 0.05;

/// Status tolerance of top-line KPI cards.
pub const CARD_TOLERANCE: f64 = 0.03;

/// Number of trailing points a trend looks at.
const TREND_WINDOW: usize = 3;

/// Summed figures of a module or a set of chart rows. `wip` is never negative.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub input: f64,
    pub output: f64,
    pub gap: f64,
    pub wip: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Flat => "flat",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Good,
    Caution,
    Critical,
}

impl Status {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Good => "good",
            Status::Caution => "caution",
            Status::Critical => "critical",
        }
    }
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Totals of a module bundle. Captured gap and WIP rows take precedence over
/// figures derived from input and output.
pub fn totals(bundle: &ModuleBundle) -> Totals {
    let input = sum(&bundle.input);
    let output = sum(&bundle.output);
    let gap = if bundle.gap.is_empty() {
        sum(&gap_series(&bundle.input, &bundle.output))
    } else {
        sum(&bundle.gap)
    };
    let wip = if bundle.wip.is_empty() {
        input - output
    } else {
        sum(&bundle.wip)
    };
    Totals {
        input,
        output,
        gap,
        wip: wip.max(0.0),
    }
}

/// Totals of chart rows or tall records.
pub fn record_totals(records: &[FlatRecord]) -> Totals {
    let input = records.iter().map(|record| record.input).sum::<f64>();
    let output = records.iter().map(|record| record.output).sum::<f64>();
    Totals {
        input,
        output,
        gap: records.iter().map(|record| record.gap).sum(),
        wip: (input - output).max(0.0),
    }
}

/// Elementwise `input - output`; a missing element counts as 0.
pub fn gap_series(input: &[f64], output: &[f64]) -> Vec<f64> {
    let len = input.len().max(output.len());
    (0..len)
        .map(|i| input.get(i).copied().unwrap_or(0.0) - output.get(i).copied().unwrap_or(0.0))
        .collect()
}

/// Captured WIP series, or the positive part of the daily gap when none was captured.
pub fn wip_series(bundle: &ModuleBundle) -> Vec<f64> {
    if !bundle.wip.is_empty() {
        return bundle.wip.clone();
    }
    gap_series(&bundle.input, &bundle.output)
        .into_iter()
        .map(|gap| gap.max(0.0))
        .collect()
}

/// Direction of the last few points of a series.
pub fn trend(values: &[f64]) -> Trend {
    let window = &values[values.len().saturating_sub(TREND_WINDOW)..];
    match (window.first(), window.last()) {
        (Some(first), Some(last)) if window.len() >= 2 => {
            if last > first {
                Trend::Rising
            } else if last < first {
                Trend::Falling
            } else {
                Trend::Flat
            }
        }
        _ => Trend::Flat,
    }
}

/// Classifies an actual value against its target.
///
/// The relative difference is taken against the target (or 1 when the target is 0).
/// Meeting the target in the good direction is `Good`; missing it by at most
/// `tolerance` is `Caution`; anything further off is `Critical`.
pub fn status(actual: f64, target: f64, reverse_good: bool, tolerance: f64) -> Status {
    let base = if target == 0.0 { 1.0 } else { target };
    let diff = (actual - target) / base;
    let good = if reverse_good { diff <= 0.0 } else { diff >= 0.0 };
    if good {
        Status::Good
    } else if diff.abs() <= tolerance {
        Status::Caution
    } else {
        Status::Critical
    }
}

/// Label of the single bucket produced for a non-daily mode.
pub fn bucket_label(mode: MonitorMode, period: &str) -> String {
    match mode {
        MonitorMode::Quarterly => {
            let week = Regex::new(r"(?i)WK\d+").expect("Hardcode regex pattern");
            week.replace(period, "Q1").into_owned()
        }
        _ => period.to_string(),
    }
}

/// Groups daily rows by monitor mode. Daily rows pass through; weekly and
/// quarterly modes sum every row into one bucket labelled by the period.
pub fn aggregate(rows: &[FlatRecord], mode: MonitorMode, period: &str) -> Vec<FlatRecord> {
    if mode == MonitorMode::Daily {
        return rows.to_vec();
    }
    let totals = record_totals(rows);
    vec![FlatRecord::new(bucket_label(mode, period), totals.input, totals.output, totals.gap)]
}

/// Per-day base target scaled to the number of days covered.
pub fn scaled_target(base: Option<f64>, count: usize, mode: MonitorMode) -> f64 {
    match (base, mode) {
        (None, _) => 0.0,
        (Some(base), MonitorMode::Daily) => base,
        (Some(base), _) => base * count.max(1) as f64,
    }
}

/// Series and totals of one module as shown on its panel.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub days: Vec<String>,
    pub input: Vec<f64>,
    pub output: Vec<f64>,
    /// Daily `input - output`
    pub gap: Vec<f64>,
    pub wip: Vec<f64>,
    pub totals: Totals,
    /// Number of days covered, at least 1
    pub day_count: usize,
}

pub fn module_summary(bundle: &ModuleBundle) -> ModuleSummary {
    let gap = gap_series(&bundle.input, &bundle.output);
    let day_count = if bundle.days.is_empty() { gap.len() } else { bundle.days.len() };
    ModuleSummary {
        days: bundle.days.clone(),
        input: bundle.input.clone(),
        output: bundle.output.clone(),
        wip: wip_series(bundle),
        totals: totals(bundle),
        gap,
        day_count: day_count.max(1),
    }
}
