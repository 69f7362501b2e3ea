use anyhow::Context;
use backtester::Backtester;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{AssetSettings, load_config};
use core_types::{BacktestReport, Portfolio, PortfolioAsset, PricePoint};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The main entry point for the meridian backtesting application.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Evaluates the historical performance of index portfolios.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the backtest described by a TOML request file.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path of the backtest request file (TOML).
    #[arg(long, default_value = "backtest")]
    config: String,

    /// Write the full report as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;

    let assets = config
        .assets
        .iter()
        .map(load_asset)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let portfolio = Portfolio {
        assets,
        rebalancing_months: config.portfolio.rebalancing_months,
        investment_duration_years: config.portfolio.investment_duration_years,
        initial_cash: config.portfolio.initial_cash,
        monthly_cash: config.portfolio.monthly_cash,
        start_date: config.portfolio.start_date,
        end_date: config.portfolio.end_date,
    };

    let report = Backtester::new(portfolio).run()?;
    print_summary(&report);

    if let Some(path) = args.output {
        let file = File::create(&path)
            .with_context(|| format!("failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("Full report written to {}", path.display());
    }

    Ok(())
}

/// Reads one asset's price series from disk and pairs it with its targets.
///
/// The engine assumes ascending date order and does not re-sort, so the
/// input layer guarantees it here.
fn load_asset(settings: &AssetSettings) -> anyhow::Result<PortfolioAsset> {
    let raw = std::fs::read_to_string(&settings.data_file).with_context(|| {
        format!(
            "failed to read price series for '{}' from {}",
            settings.name,
            settings.data_file.display()
        )
    })?;
    let mut series: Vec<PricePoint> = serde_json::from_str(&raw)
        .with_context(|| format!("malformed price series for '{}'", settings.name))?;
    series.sort_by_key(|point| point.date);

    Ok(PortfolioAsset {
        allocation: settings.allocation,
        fee: settings.fee,
        series,
    })
}

fn print_summary(report: &BacktestReport) {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["CAGR".to_string(), pct(report.analysis.cagr)]);
    table.add_row(vec!["TWRR".to_string(), opt_pct(report.analysis.twrr)]);
    table.add_row(vec!["MWRR".to_string(), opt_pct(report.analysis.mwrr)]);
    table.add_row(vec![
        "Modified Dietz".to_string(),
        opt_pct(report.analysis.modified_dietz),
    ]);
    table.add_row(vec![
        "Stdev (annualized)".to_string(),
        opt_pct(report.analysis.stdev),
    ]);
    println!("{table}");

    if let Some(rolling) = &report.rolling {
        if rolling.is_empty() {
            println!("Rolling analysis: no window produced a solvable return.");
            return;
        }
        let worst = rolling
            .iter()
            .fold(f64::INFINITY, |acc, w| acc.min(w.mwrr));
        let best = rolling
            .iter()
            .fold(f64::NEG_INFINITY, |acc, w| acc.max(w.mwrr));
        println!(
            "Rolling analysis: {} windows, MWRR from {} to {}.",
            rolling.len(),
            pct(worst),
            pct(best)
        );
    }
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), pct)
}
