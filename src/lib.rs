//! # Throughput Board
//!
//! Reads production board spreadsheets and turns them into per-module daily
//! throughput series and dashboard figures.
//!
//! ## Features
//!
//! - **Upload decoding**: Excel 2007+ workbooks (`.xlsx`, `.xlsm`) and delimited text
//!   (`.csv`, `.txt`, `.tsv`); only the first sheet is read
//! - **Board layout detection**: module sections (`TOSA Level`, `Module PCBA Assy`,
//!   `Module internal`, `FG Level`), a `Mon..Sun` day row at any column, and labelled
//!   metric rows (`Daily Actual Input`, `Actual Output`, `Accumulate gap`, `WIP`)
//! - **Tall-table fallback**: `name`/`day`, `input`, `output`, `gap` columns
//! - **Fail-soft numbers**: thousands separators, `(1,234)` negatives and `-` zeros
//! - **Derived metrics**: totals, gap and WIP series, trends, target status and
//!   daily/weekly/quarterly aggregation with scaled targets
//!
//! ## Usage
//!
//! ```no_run
//! use throughput_board::{Dashboard, DashboardConfig, ModuleKey};
//!
//! let bytes = std::fs::read("board.xlsx").unwrap();
//! let mut dashboard = Dashboard::new(DashboardConfig::default());
//! dashboard.upload("board.xlsx", &bytes).unwrap();
//! for card in dashboard.kpi_cards() {
//!     println!("{}: {} ({})", card.label, card.value, card.status.as_str());
//! }
//! let panel = dashboard.module_panel(ModuleKey::TosaLevel);
//! ```
pub mod board;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod spreadsheet;
pub mod upload;

pub(crate) mod helpers;

pub use board::extract_board;
pub use board::extract_flat;
pub use board::extract_grid;
pub use board::parse_number;
pub use board::Board;
pub use board::ExtractionResult;
pub use board::FlatRecord;
pub use board::ModuleBundle;
pub use board::ModuleKey;
pub use config::DashboardConfig;
pub use config::MonitorMode;
pub use dashboard::Dashboard;
pub use error::BoardError;
pub use helpers::xml::XmlError;
pub use spreadsheet::Cell;
pub use spreadsheet::Grid;
pub use upload::UploadError;
