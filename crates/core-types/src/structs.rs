use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single sampled price of one asset on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// An asset's price history, sorted ascending by date with one sample per
/// date. The engine assumes this ordering and never re-sorts; producing it
/// is the data source's contract.
pub type PriceSeries = Vec<PricePoint>;

/// One portfolio constituent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAsset {
    /// Target allocation as a fraction in `[0, 1]`. Allocations across a
    /// portfolio must sum to 1; the input layer validates this, not the
    /// engine.
    pub allocation: f64,
    /// Annual fee as a fraction in `[0, 1)`, applied by the simulator as
    /// monthly-compounded decay.
    pub fee: f64,
    pub series: PriceSeries,
}

/// A complete backtest request. Immutable input; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub assets: Vec<PortfolioAsset>,
    /// Rebalance holdings back to target allocations every N months.
    /// `None` disables rebalancing.
    pub rebalancing_months: Option<u32>,
    /// When set, additionally runs the rolling-window analysis over every
    /// sub-period of this many years.
    pub investment_duration_years: Option<u32>,
    /// Lump contribution paid in at the first step.
    pub initial_cash: f64,
    /// Contribution paid in at every step after the first.
    pub monthly_cash: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One time-step of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub total_value: f64,
    /// Per-asset values, index-aligned with `Portfolio::assets`.
    pub asset_values: Vec<f64>,
    /// The contribution paid in at this step.
    pub cash_flow: f64,
}

/// Performance metrics derived from one backtest.
///
/// The cash-flow-sensitive metrics (TWRR, MWRR, Modified Dietz) are present
/// only when the request included monthly contributions; a metric that could
/// not be computed is absent, never zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub cagr: f64,
    pub twrr: Option<f64>,
    pub mwrr: Option<f64>,
    pub modified_dietz: Option<f64>,
    /// Annualized standard deviation of monthly returns.
    pub stdev: Option<f64>,
}

/// The money-weighted return of one fixed-length sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mwrr: f64,
}

/// The engine's top-level output, produced once per backtest request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub snapshots: Vec<Snapshot>,
    pub analysis: PortfolioAnalysis,
    pub rolling: Option<Vec<RollingWindow>>,
}
