//! # Rolling-Window Analyzer
//!
//! Repeats the contribution-mode simulation and money-weighted-return solve
//! over every fixed-length sliding window of the aligned date range, showing
//! the distribution of historical outcomes for one investment duration.

use core_types::{Portfolio, PriceSeries, RollingWindow};
use metrics::MetricsEngine;
use simulator::simulate;
use tracing::{debug, warn};

pub mod error;

pub use error::RollingError;

/// The engine for sliding-window backtest analysis.
pub struct RollingEngine {
    duration_months: usize,
    metrics: MetricsEngine,
}

impl RollingEngine {
    pub fn new(duration_years: u32) -> Self {
        Self {
            duration_months: duration_years as usize * 12,
            metrics: MetricsEngine::new(),
        }
    }

    /// Slides a window of the configured duration across `aligned` and
    /// collects the money-weighted return of each.
    ///
    /// Each window covers `duration_months` sampling steps (one more point
    /// than steps). Windows whose solve yields no finite rate are dropped
    /// from the output, not reported as errors. Output order follows
    /// ascending window start.
    pub fn run(
        &self,
        portfolio: &Portfolio,
        aligned: &[PriceSeries],
    ) -> Result<Vec<RollingWindow>, RollingError> {
        let total_points = aligned.first().map_or(0, |series| series.len());
        if total_points <= self.duration_months {
            debug!(
                total_points,
                duration_months = self.duration_months,
                "range shorter than one window, nothing to analyse"
            );
            return Ok(Vec::new());
        }
        let window_count = total_points - self.duration_months;

        let mut windows = Vec::with_capacity(window_count);
        for offset in 0..window_count {
            let slices: Vec<PriceSeries> = aligned
                .iter()
                .map(|series| series[offset..=offset + self.duration_months].to_vec())
                .collect();

            let snapshots = simulate(portfolio, &slices)?;
            match self.metrics.mwrr(&snapshots) {
                Ok(mwrr) => windows.push(RollingWindow {
                    start_date: slices[0][0].date,
                    end_date: slices[0][self.duration_months].date,
                    mwrr,
                }),
                Err(err) => {
                    warn!(offset, error = %err, "skipping window without a solvable money-weighted return");
                }
            }
        }

        debug!(
            total = window_count,
            kept = windows.len(),
            "rolling analysis complete"
        );
        Ok(windows)
    }
}
