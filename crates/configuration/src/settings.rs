use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// The root structure of a backtest request file.
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    pub portfolio: PortfolioSettings,
    pub assets: Vec<AssetSettings>,
}

/// Cash-flow and scheduling parameters for one backtest.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSettings {
    /// Lump contribution paid in at the first simulated month.
    pub initial_cash: f64,
    /// Contribution paid in every following month.
    #[serde(default)]
    pub monthly_cash: f64,
    /// Rebalance holdings back to target allocations every N months.
    /// Omit to never rebalance.
    pub rebalancing_months: Option<u32>,
    /// Enables rolling-window analysis over every sub-period of this many
    /// years.
    pub investment_duration_years: Option<u32>,
    /// Optional clamp on the start of the simulated range.
    pub start_date: Option<NaiveDate>,
    /// Optional clamp on the end of the simulated range.
    pub end_date: Option<NaiveDate>,
}

/// One constituent of the portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSettings {
    /// Display name, used in logs and summary output only.
    pub name: String,
    /// Target allocation fraction. Allocations across all assets must sum
    /// to 1.
    pub allocation: f64,
    /// Annual fee fraction.
    #[serde(default)]
    pub fee: f64,
    /// Path to a JSON file holding the asset's price series, sorted
    /// ascending by date.
    pub data_file: PathBuf,
}
