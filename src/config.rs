use crate::board::ModuleKey;
use crate::error::BoardError;
use crate::metrics::CARD_TOLERANCE;
use crate::metrics::ROW_TOLERANCE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to dashboard parameters.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid monitor mode '{0}', expected daily, weekly or quarterly")]
    ModeError(String),

    #[error("Invalid period '{0}'")]
    PeriodError(String),
}

/// Time bucket used when charting and scaling targets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    #[default]
    Daily,
    Weekly,
    Quarterly,
}

impl MonitorMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MonitorMode::Daily => "daily",
            MonitorMode::Weekly => "weekly",
            MonitorMode::Quarterly => "quarterly",
        }
    }
}

impl FromStr for MonitorMode {
    type Err = ConfigError;

    /// Parses a mode name. Supports short aliases for each mode.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DAILY" | "DAY" | "D" => Ok(Self::Daily),
            "WEEKLY" | "WEEK" | "WK" | "W" => Ok(Self::Weekly),
            "QUARTERLY" | "QUARTER" | "Q" => Ok(Self::Quarterly),
            _ => Err(ConfigError::ModeError(name.to_string())),
        }
    }
}

impl Display for MonitorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-day base targets of one module.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ModuleTargets {
    pub input: f64,
    pub output: f64,
    /// Standing WIP level, never scaled by day count
    pub wip: f64,
}

impl ModuleTargets {
    pub const fn new(input: f64, output: f64, wip: f64) -> Self {
        Self { input, output, wip }
    }
}

/// Per-day base targets of the top-line KPI cards.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct KpiTargets {
    pub input: f64,
    pub output: f64,
    pub gap: f64,
    pub wip: f64,
}

impl Default for KpiTargets {
    fn default() -> Self {
        Self {
            input: 765.0,
            output: 758.0,
            gap: 0.0,
            wip: 12665.0,
        }
    }
}

/// Settings of the dashboard queries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardConfig {
    pub mode: MonitorMode,

    /// Period identifier labelling aggregated buckets, e.g. `WK6`
    pub period: String,

    /// Status tolerance of module panel lines
    pub row_tolerance: f64,

    /// Status tolerance of KPI cards
    pub card_tolerance: f64,

    pub kpi_targets: KpiTargets,

    pub module_targets: BTreeMap<ModuleKey, ModuleTargets>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let module_targets = BTreeMap::from([
            (ModuleKey::TosaLevel, ModuleTargets::new(765.0, 758.0, 12665.0)),
            (ModuleKey::PcbaAssy, ModuleTargets::new(950.0, 940.0, 15000.0)),
            (ModuleKey::Internal, ModuleTargets::new(800.0, 820.0, 11000.0)),
            (ModuleKey::FgLevel, ModuleTargets::new(500.0, 500.0, 20000.0)),
        ]);
        Self {
            mode: MonitorMode::Daily,
            period: "WK6".to_string(),
            row_tolerance: ROW_TOLERANCE,
            card_tolerance: CARD_TOLERANCE,
            kpi_targets: KpiTargets::default(),
            module_targets,
        }
    }
}

impl DashboardConfig {
    /// Sets the monitor mode from its name or alias.
    pub fn with_mode(mut self, mode: &str) -> Result<Self, BoardError> {
        self.mode = mode.parse()?;
        Ok(self)
    }

    /// Sets the period identifier; blank or multi-word identifiers are rejected.
    pub fn with_period(mut self, period: &str) -> Result<Self, BoardError> {
        let trimmed = period.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(ConfigError::PeriodError(period.to_string()).into());
        }
        self.period = trimmed.to_string();
        Ok(self)
    }

    pub fn targets_for(&self, key: ModuleKey) -> Option<ModuleTargets> {
        self.module_targets.get(&key).copied()
    }
}
