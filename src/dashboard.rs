//! # Dashboard Queries
//!
//! [`Dashboard`] holds the latest extraction result and answers the queries a
//! board view needs: per-day rows of the active module, mode-aggregated chart
//! rows, top-line KPI cards and per-module metric panels. Until the first
//! upload it serves a built-in demo week.
use crate::board::ExtractionResult;
use crate::board::FlatRecord;
use crate::board::ModuleBundle;
use crate::board::ModuleKey;
use crate::board::DAY_LABELS;
use crate::config::DashboardConfig;
use crate::metrics;
use crate::metrics::ModuleSummary;
use crate::metrics::Status;
use crate::metrics::Totals;
use crate::metrics::Trend;
use crate::upload;
use crate::upload::UploadError;
use serde::Serialize;
use tracing::debug;

/// Demo week of the TOSA module as `(input, output, accumulated gap)`.
const SAMPLE_WEEK: [(f64, f64, f64); 7] = [
    (710.0, 914.0, -3317.0),
    (998.0, 1363.0, -2868.0),
    (1000.0, 990.0, -2636.0),
    (1047.0, 817.0, -2577.0),
    (0.0, 0.0, -3335.0),
    (0.0, 0.0, -4093.0),
    (0.0, 0.0, -4851.0),
];

/// Demo `(input, output)` series of the remaining modules.
const SAMPLE_PCBA_ASSY: ([f64; 7], [f64; 7]) = (
    [650.0, 700.0, 800.0, 950.0, 980.0, 1020.0, 998.0],
    [600.0, 720.0, 760.0, 900.0, 1000.0, 1200.0, 1363.0],
);
const SAMPLE_INTERNAL: ([f64; 7], [f64; 7]) = (
    [700.0, 750.0, 780.0, 820.0, 900.0, 950.0, 1000.0],
    [650.0, 700.0, 730.0, 800.0, 870.0, 920.0, 990.0],
);
const SAMPLE_FG_LEVEL: ([f64; 7], [f64; 7]) = (
    [500.0, 480.0, 460.0, 420.0, 200.0, 50.0, 0.0],
    [450.0, 430.0, 400.0, 300.0, 200.0, 10.0, 0.0],
);

fn sample_week() -> Vec<FlatRecord> {
    DAY_LABELS
        .iter()
        .zip(SAMPLE_WEEK)
        .map(|(day, (input, output, gap))| FlatRecord::new(*day, input, output, gap))
        .collect()
}

fn sample_bundle(key: ModuleKey) -> ModuleBundle {
    let (input, output) = match key {
        ModuleKey::TosaLevel => (
            SAMPLE_WEEK.map(|(input, _, _)| input),
            SAMPLE_WEEK.map(|(_, output, _)| output),
        ),
        ModuleKey::PcbaAssy => SAMPLE_PCBA_ASSY,
        ModuleKey::Internal => SAMPLE_INTERNAL,
        ModuleKey::FgLevel => SAMPLE_FG_LEVEL,
    };
    ModuleBundle {
        days: DAY_LABELS.map(String::from).to_vec(),
        input: input.to_vec(),
        output: output.to_vec(),
        ..Default::default()
    }
}

/// Per-day rows of a bundle. The captured gap is used where present.
fn bundle_rows(bundle: &ModuleBundle) -> Vec<FlatRecord> {
    let len = if bundle.days.is_empty() {
        bundle.input.len().max(bundle.output.len()).max(bundle.gap.len())
    } else {
        bundle.days.len()
    };
    (0..len)
        .map(|i| {
            let name = bundle.days.get(i).cloned().unwrap_or_else(|| format!("Day {}", i + 1));
            let input = bundle.input.get(i).copied().unwrap_or(0.0);
            let output = bundle.output.get(i).copied().unwrap_or(0.0);
            let gap = bundle.gap.get(i).copied().unwrap_or(input - output);
            FlatRecord::new(name, input, output, gap)
        })
        .collect()
}

/// One line of a module panel.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricLine {
    pub name: &'static str,
    pub target: f64,
    pub actual: f64,
    /// `actual - target`
    pub gap: f64,
    pub series: Vec<f64>,
    pub trend: Trend,
    pub status: Status,
    pub reverse_good: bool,
    /// Target and actual are not meaningful for display, only gap and trend
    pub hide_target_actual: bool,
}

impl MetricLine {
    fn new(name: &'static str, target: f64, actual: f64, series: Vec<f64>, reverse_good: bool, tolerance: f64) -> Self {
        Self {
            name,
            target,
            actual,
            gap: actual - target,
            trend: metrics::trend(&series),
            status: metrics::status(actual, target, reverse_good, tolerance),
            series,
            reverse_good,
            hide_target_actual: false,
        }
    }
}

/// Four metric lines of one module.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModulePanel {
    pub module: ModuleKey,
    pub title: &'static str,
    pub lines: Vec<MetricLine>,
}

/// Top-line figure compared against its KPI target.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: f64,
    pub target: f64,
    pub status: Status,
    pub reverse_good: bool,
}

impl KpiCard {
    fn new(label: &'static str, value: f64, target: f64, reverse_good: bool, tolerance: f64) -> Self {
        Self {
            label,
            value,
            target,
            status: metrics::status(value, target, reverse_good, tolerance),
            reverse_good,
        }
    }
}

/// Latest upload plus the settings used to present it.
#[derive(Debug, Default)]
pub struct Dashboard {
    config: DashboardConfig,
    result: Option<ExtractionResult>,
    active_module: Option<ModuleKey>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            result: None,
            active_module: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DashboardConfig {
        &mut self.config
    }

    /// Result of the last successful upload.
    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    /// Module feeding the daily rows; `TOSA Level` unless an upload or the caller chose another.
    pub fn active_module(&self) -> ModuleKey {
        self.active_module.unwrap_or(ModuleKey::TosaLevel)
    }

    pub fn set_active_module(&mut self, key: ModuleKey) {
        self.active_module = Some(key);
    }

    /// Replaces the current result with the upload's. A failed upload keeps the previous result.
    pub fn upload(&mut self, file_name: &str, bytes: &[u8]) -> Result<&ExtractionResult, UploadError> {
        let result = upload::process(file_name, bytes)?;
        if let Some(first) = result.board().and_then(|board| board.first_key()) {
            debug!(module = %first, "Selecting first uploaded module");
            self.active_module = Some(first);
        }
        Ok(self.result.insert(result))
    }

    /// Series and totals of a module. Before any upload the demo week is shown;
    /// afterwards a module missing from the upload has an empty summary.
    pub fn module_summary(&self, key: ModuleKey) -> ModuleSummary {
        match &self.result {
            None => metrics::module_summary(&sample_bundle(key)),
            Some(result) => match result.board().and_then(|board| board.get(key)) {
                Some(bundle) => metrics::module_summary(bundle),
                None => metrics::module_summary(&ModuleBundle::default()),
            },
        }
    }

    /// Per-day rows of the active module, the uploaded tall records, or the demo week.
    pub fn daily_rows(&self) -> Vec<FlatRecord> {
        match &self.result {
            None => sample_week(),
            Some(ExtractionResult::Board { modules }) => modules
                .get(self.active_module())
                .map(bundle_rows)
                .unwrap_or_default(),
            Some(ExtractionResult::Flat { records }) => records.clone(),
            Some(ExtractionResult::Empty) => Vec::new(),
        }
    }

    /// Daily rows grouped by the configured monitor mode.
    pub fn chart_rows(&self) -> Vec<FlatRecord> {
        metrics::aggregate(&self.daily_rows(), self.config.mode, &self.config.period)
    }

    pub fn totals(&self) -> Totals {
        metrics::record_totals(&self.chart_rows())
    }

    /// Total Input, Total Output, Accumulated Gap and WIP against the KPI targets.
    /// Input and output targets scale with the number of daily rows outside daily mode.
    pub fn kpi_cards(&self) -> Vec<KpiCard> {
        let totals = self.totals();
        let day_count = self.daily_rows().len();
        let targets = &self.config.kpi_targets;
        let mode = self.config.mode;
        let tolerance = self.config.card_tolerance;
        vec![
            KpiCard::new("Total Input", totals.input, metrics::scaled_target(Some(targets.input), day_count, mode), false, tolerance),
            KpiCard::new("Total Output", totals.output, metrics::scaled_target(Some(targets.output), day_count, mode), false, tolerance),
            KpiCard::new("Accumulated Gap", totals.gap, targets.gap, true, tolerance),
            KpiCard::new("WIP", totals.wip, targets.wip, true, tolerance),
        ]
    }

    /// Input, output, gap and WIP lines of one module against its targets.
    pub fn module_panel(&self, key: ModuleKey) -> ModulePanel {
        let summary = self.module_summary(key);
        let targets = self.config.targets_for(key);
        let mode = self.config.mode;
        let tolerance = self.config.row_tolerance;

        let input_target = metrics::scaled_target(targets.map(|targets| targets.input), summary.day_count, mode);
        let output_target = metrics::scaled_target(targets.map(|targets| targets.output), summary.day_count, mode);
        let wip_target = targets.map(|targets| targets.wip).unwrap_or(0.0);

        let mut gap = MetricLine::new("Accumulated Gap", 0.0, summary.totals.gap, summary.gap, true, tolerance);
        gap.hide_target_actual = true;

        ModulePanel {
            module: key,
            title: key.title(),
            lines: vec![
                MetricLine::new("Daily Input", input_target, summary.totals.input, summary.input, false, tolerance),
                MetricLine::new("Daily Output", output_target, summary.totals.output, summary.output, false, tolerance),
                gap,
                MetricLine::new("WIP Level", wip_target, summary.totals.wip, summary.wip, true, tolerance),
            ],
        }
    }

    /// Panels of every module in board order.
    /// A module missing from the uploaded board reports all-zero lines.
    pub fn module_panels(&self) -> Vec<ModulePanel> {
        ModuleKey::ALL.into_iter().map(|key| self.module_panel(key)).collect()
    }
}
