//! # Series Aligner
//!
//! Finds the sub-range of sampling dates shared by every asset in a
//! portfolio and slices each price series to it, so the simulator can walk
//! all assets in lockstep.

use chrono::NaiveDate;
use core_types::{Portfolio, PriceSeries};
use tracing::debug;

pub mod error;

pub use error::AlignerError;

/// Two sample dates count as the same sampling instant when they fall within
/// seven days of each other. Index providers publish month-end figures on
/// slightly different calendars; this tolerance absorbs that drift.
const DATE_TOLERANCE_DAYS: i64 = 7;

fn is_same_sample(a: NaiveDate, b: NaiveDate) -> bool {
    (a - b).num_days().abs() < DATE_TOLERANCE_DAYS
}

/// Computes the common date window across every asset series and slices each
/// series to that inclusive range.
///
/// The window starts at the latest first-sample date and ends at the
/// earliest last-sample date, further clamped by the request's optional
/// start/end bounds. Boundary samples are matched with the 7-day tolerance,
/// taking the first match in scan order.
///
/// All returned series hold exactly the same number of points; differing
/// counts are a fatal [`AlignerError::MisalignedSeries`].
pub fn align(portfolio: &Portfolio) -> Result<Vec<PriceSeries>, AlignerError> {
    if portfolio.assets.is_empty() {
        return Err(AlignerError::NoAssets);
    }
    for (idx, asset) in portfolio.assets.iter().enumerate() {
        if asset.series.is_empty() {
            return Err(AlignerError::EmptySeries { asset: idx });
        }
    }

    let first_series = &portfolio.assets[0].series;
    let mut start_date = first_series[0].date;
    let mut end_date = first_series[first_series.len() - 1].date;
    for asset in &portfolio.assets[1..] {
        start_date = start_date.max(asset.series[0].date);
        end_date = end_date.min(asset.series[asset.series.len() - 1].date);
    }

    if let Some(caller_start) = portfolio.start_date {
        start_date = start_date.max(caller_start);
    }
    if let Some(caller_end) = portfolio.end_date {
        end_date = end_date.min(caller_end);
    }

    if start_date > end_date {
        return Err(AlignerError::EmptyWindow {
            start: start_date,
            end: end_date,
        });
    }

    let mut aligned = Vec::with_capacity(portfolio.assets.len());
    for (idx, asset) in portfolio.assets.iter().enumerate() {
        let start_idx = asset
            .series
            .iter()
            .position(|p| is_same_sample(p.date, start_date))
            .ok_or(AlignerError::BoundaryNotFound {
                asset: idx,
                date: start_date,
            })?;
        let end_idx = asset
            .series
            .iter()
            .position(|p| is_same_sample(p.date, end_date))
            .ok_or(AlignerError::BoundaryNotFound {
                asset: idx,
                date: end_date,
            })?;
        if end_idx < start_idx {
            return Err(AlignerError::EmptyWindow {
                start: start_date,
                end: end_date,
            });
        }
        aligned.push(asset.series[start_idx..=end_idx].to_vec());
    }

    let counts: Vec<usize> = aligned.iter().map(|s| s.len()).collect();
    if counts.windows(2).any(|pair| pair[0] != pair[1]) {
        let mut distinct = counts;
        distinct.sort_unstable();
        distinct.dedup();
        return Err(AlignerError::MisalignedSeries { counts: distinct });
    }

    debug!(points = counts[0], %start_date, %end_date, "aligned asset series");
    Ok(aligned)
}
