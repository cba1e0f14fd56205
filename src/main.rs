use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use throughput_board::dashboard::{KpiCard, ModulePanel};
use throughput_board::logging::init_logging;
use throughput_board::metrics::Totals;
use throughput_board::{Dashboard, DashboardConfig, ExtractionResult, FlatRecord, ModuleKey, MonitorMode};
use tracing::debug;

#[derive(Parser)]
#[command(name = "throughput-board")]
#[command(about = "Production board report from an uploaded spreadsheet")]
#[command(version)]
struct Cli {
    /// Board workbook (.xlsx, .xlsm) or delimited rows (.csv, .txt, .tsv)
    file: PathBuf,

    /// Monitor mode: daily, weekly or quarterly
    #[arg(long, default_value = "daily")]
    mode: String,

    /// Period identifier labelling weekly and quarterly buckets
    #[arg(long, default_value = "WK6")]
    period: String,

    /// Module feeding the chart and KPI rows (e.g. tosa, pcba, internal, fg)
    #[arg(long)]
    module: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Report<'a> {
    mode: MonitorMode,
    period: &'a str,
    active_module: ModuleKey,
    result: Option<&'a ExtractionResult>,
    chart_rows: Vec<FlatRecord>,
    totals: Totals,
    kpi_cards: Vec<KpiCard>,
    modules: Vec<ModulePanel>,
}

fn find_module(name: &str) -> Result<ModuleKey> {
    let needle = name.trim().to_ascii_lowercase();
    match ModuleKey::ALL
        .into_iter()
        .find(|key| !needle.is_empty() && key.label().to_ascii_lowercase().contains(&needle))
    {
        Some(key) => Ok(key),
        None => bail!("Unknown module '{}'", name),
    }
}

fn print_text(report: &Report) {
    let kind = match report.result {
        Some(ExtractionResult::Board { modules }) => format!("board, {} module(s)", modules.len()),
        Some(ExtractionResult::Flat { records }) => format!("tall rows, {} record(s)", records.len()),
        Some(ExtractionResult::Empty) | None => "empty sheet".to_string(),
    };
    println!("Layout: {}", kind);
    println!("Mode: {} ({})  Active module: {}", report.mode, report.period, report.active_module);

    println!("\nKPI");
    for card in &report.kpi_cards {
        println!("  {:<16} {:>12.0}  target {:>10.0}  {}", card.label, card.value, card.target, card.status.as_str());
    }

    println!("\nChart");
    for row in &report.chart_rows {
        println!("  {:<8} input {:>8.0}  output {:>8.0}  gap {:>8.0}", row.name, row.input, row.output, row.gap);
    }

    for panel in &report.modules {
        println!("\n{}", panel.title);
        for line in &panel.lines {
            let (target, actual) = if line.hide_target_actual {
                ("-".to_string(), "-".to_string())
            } else {
                (format!("{:.0}", line.target), format!("{:.0}", line.actual))
            };
            println!(
                "  {:<16} {:>10} {:>10} {:>+10.0}  {:<8} {}",
                line.name,
                target,
                actual,
                line.gap,
                line.trend.as_str(),
                line.status.as_str()
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = DashboardConfig::default()
        .with_mode(&cli.mode)
        .context("Invalid --mode")?
        .with_period(&cli.period)
        .context("Invalid --period")?;

    let bytes = std::fs::read(&cli.file).with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cli.file.display().to_string());
    debug!(file_name, bytes = bytes.len(), "Read upload");

    let mut dashboard = Dashboard::new(config);
    dashboard.upload(&file_name, &bytes)?;
    if let Some(module) = &cli.module {
        dashboard.set_active_module(find_module(module)?);
    }

    let report = Report {
        mode: dashboard.config().mode,
        period: &dashboard.config().period,
        active_module: dashboard.active_module(),
        result: dashboard.result(),
        chart_rows: dashboard.chart_rows(),
        totals: dashboard.totals(),
        kpi_cards: dashboard.kpi_cards(),
        modules: dashboard.module_panels(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialise report")?);
    } else {
        print_text(&report);
    }
    Ok(())
}
