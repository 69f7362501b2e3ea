//! # Backtest Orchestrator
//!
//! Composes the aligner, simulator, metrics calculator and rolling-window
//! analyzer into a single entry point that turns a backtest request into a
//! [`BacktestReport`].

use aligner::align;
use core_types::{BacktestReport, CoreError, Portfolio};
use metrics::MetricsEngine;
use rolling::RollingEngine;
use simulator::simulate;
use tracing::info;

pub mod error;

pub use error::BacktestError;

/// The main backtesting engine.
pub struct Backtester {
    portfolio: Portfolio,
    metrics: MetricsEngine,
}

impl Backtester {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            metrics: MetricsEngine::new(),
        }
    }

    /// Runs the full backtest.
    ///
    /// The portfolio is simulated in contribution mode when monthly
    /// contributions are configured, and always in lump-sum mode; the
    /// analysis draws each metric from the appropriate run. When an
    /// investment duration is set, the rolling-window analysis is attached
    /// to the report.
    ///
    /// Alignment failures abort the whole backtest; no partial report is
    /// returned.
    pub fn run(&self) -> Result<BacktestReport, BacktestError> {
        self.validate()?;

        let aligned = align(&self.portfolio)?;
        info!(
            points = aligned[0].len(),
            assets = aligned.len(),
            "running backtest"
        );

        let monthly_buy = if self.portfolio.monthly_cash > 0.0 {
            Some(simulate(&self.portfolio, &aligned)?)
        } else {
            None
        };
        let single_buy = {
            let mut lump_sum = self.portfolio.clone();
            lump_sum.monthly_cash = 0.0;
            simulate(&lump_sum, &aligned)?
        };

        let analysis = self.metrics.analyse(monthly_buy.as_deref(), &single_buy)?;

        let rolling = match self.portfolio.investment_duration_years {
            Some(years) => Some(RollingEngine::new(years).run(&self.portfolio, &aligned)?),
            None => None,
        };

        Ok(BacktestReport {
            snapshots: monthly_buy.unwrap_or(single_buy),
            analysis,
            rolling,
        })
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.portfolio.assets.is_empty() {
            return Err(CoreError::InvalidInput(
                "assets".to_string(),
                "at least one asset is required".to_string(),
            ));
        }
        for (idx, asset) in self.portfolio.assets.iter().enumerate() {
            if !(0.0..1.0).contains(&asset.fee) {
                return Err(CoreError::InvalidInput(
                    format!("assets[{idx}].fee"),
                    format!("annual fee {} must be within [0, 1)", asset.fee),
                ));
            }
        }
        if self.portfolio.initial_cash < 0.0 || self.portfolio.monthly_cash < 0.0 {
            return Err(CoreError::InvalidInput(
                "contributions".to_string(),
                "contributions cannot be negative".to_string(),
            ));
        }
        if self.portfolio.initial_cash == 0.0 && self.portfolio.monthly_cash == 0.0 {
            return Err(CoreError::InvalidInput(
                "contributions".to_string(),
                "at least one contribution must be positive".to_string(),
            ));
        }
        if self.portfolio.rebalancing_months == Some(0) {
            return Err(CoreError::InvalidInput(
                "rebalancing_months".to_string(),
                "rebalancing period must be at least one month".to_string(),
            ));
        }
        if self.portfolio.investment_duration_years == Some(0) {
            return Err(CoreError::InvalidInput(
                "investment_duration_years".to_string(),
                "investment duration must be at least one year".to_string(),
            ));
        }
        Ok(())
    }
}
