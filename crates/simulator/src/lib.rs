//! # Portfolio Simulator
//!
//! Advances a multi-asset wallet month by month over pre-aligned price
//! series, applying contributions, periodic rebalancing and monthly fee
//! decay, and emits one [`Snapshot`] per step.
//!
//! The simulation is a pure function of its inputs: the wallet of fractional
//! unit-shares lives only for the duration of the call.

use core_types::{Portfolio, PriceSeries, Snapshot};

pub mod error;

pub use error::SimulatorError;

/// Runs the month-by-month simulation over `aligned`, which must hold one
/// equal-length series per portfolio asset (the aligner's postcondition).
///
/// Each step, in order:
/// 1. pays in the contribution (`initial_cash` at the first step,
///    `monthly_cash` after) split across assets by target allocation,
/// 2. rebalances holdings back to target allocations when the countdown
///    reaches zero (the countdown, not the step index, decides),
/// 3. decays every holding by `(1 - fee)^(1/12)`,
/// 4. records the snapshot at current prices.
pub fn simulate(
    portfolio: &Portfolio,
    aligned: &[PriceSeries],
) -> Result<Vec<Snapshot>, SimulatorError> {
    if aligned.len() != portfolio.assets.len() {
        return Err(SimulatorError::AssetCountMismatch {
            assets: portfolio.assets.len(),
            series: aligned.len(),
        });
    }
    let steps = match aligned.first() {
        Some(series) => series.len(),
        None => return Ok(Vec::new()),
    };

    let monthly_fees: Vec<f64> = portfolio
        .assets
        .iter()
        .map(|asset| (1.0 - asset.fee).powf(1.0 / 12.0))
        .collect();

    // Fractional unit-shares held of each asset.
    let mut wallet = vec![0.0_f64; portfolio.assets.len()];
    let mut months_until_rebalancing = portfolio.rebalancing_months.unwrap_or(0);

    let mut snapshots = Vec::with_capacity(steps);
    for step in 0..steps {
        let cash_in = if step == 0 {
            portfolio.initial_cash
        } else {
            portfolio.monthly_cash
        };

        // Buy in at current prices, split by target allocation.
        for (idx, asset) in portfolio.assets.iter().enumerate() {
            wallet[idx] += asset.allocation * cash_in / aligned[idx][step].value;
        }

        if let Some(period) = portfolio.rebalancing_months {
            if months_until_rebalancing == 0 {
                let total_value: f64 = wallet
                    .iter()
                    .zip(aligned)
                    .map(|(shares, series)| shares * series[step].value)
                    .sum();
                for (idx, asset) in portfolio.assets.iter().enumerate() {
                    wallet[idx] = asset.allocation * total_value / aligned[idx][step].value;
                }
                months_until_rebalancing = period;
            }
            months_until_rebalancing = months_until_rebalancing.saturating_sub(1);
        }

        // Fee decay applies every step, after buy-in and rebalancing.
        for (shares, fee) in wallet.iter_mut().zip(&monthly_fees) {
            *shares *= fee;
        }

        let asset_values: Vec<f64> = wallet
            .iter()
            .zip(aligned)
            .map(|(shares, series)| shares * series[step].value)
            .collect();
        let total_value = asset_values.iter().sum();

        snapshots.push(Snapshot {
            date: aligned[0][step].date,
            total_value,
            asset_values,
            cash_flow: cash_in,
        });
    }

    Ok(snapshots)
}
