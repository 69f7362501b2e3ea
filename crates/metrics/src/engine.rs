use crate::error::MetricsError;
use core_types::{PortfolioAnalysis, Snapshot};
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.25;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Absolute net-present-value tolerance at which the secant solve stops.
const SECANT_TOLERANCE: f64 = 1e-3;
/// Iteration cap for the secant solve, counting the two seed evaluations.
const SECANT_MAX_ITERATIONS: usize = 200;

/// A stateless calculator for return metrics over a snapshot series.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles the full analysis from the available simulation runs.
    ///
    /// Cash-flow-sensitive metrics (TWRR, MWRR, Modified Dietz) come from
    /// the contribution run only and degrade to absent on failure. CAGR
    /// prefers the contribution run and is load-bearing: its failure aborts
    /// the analysis. The standard deviation always comes from the lump-sum
    /// run, whose value path is free of contribution inflows.
    pub fn analyse(
        &self,
        monthly_buy: Option<&[Snapshot]>,
        single_buy: &[Snapshot],
    ) -> Result<PortfolioAnalysis, MetricsError> {
        let cagr = self.cagr(monthly_buy.unwrap_or(single_buy))?;
        let stdev = optional("stdev", self.annualized_stdev(single_buy));

        let (twrr, mwrr, modified_dietz) = match monthly_buy {
            Some(points) => (
                optional("TWRR", self.twrr(points)),
                optional("MWRR", self.mwrr(points)),
                optional("Modified Dietz", self.modified_dietz(points)),
            ),
            None => (None, None, None),
        };

        Ok(PortfolioAnalysis {
            cagr,
            twrr,
            mwrr,
            modified_dietz,
            stdev,
        })
    }

    /// Compound annual growth rate: `(V_last / V_first)^(1/years) - 1`.
    pub fn cagr(&self, points: &[Snapshot]) -> Result<f64, MetricsError> {
        let (first, last) = boundary(points, 2, "CAGR")?;
        if first.total_value <= 0.0 {
            return Err(MetricsError::NonPositiveBaseline {
                value: first.total_value,
            });
        }
        let years = years_between(first, last)?;
        finite(
            "CAGR",
            (last.total_value / first.total_value).powf(1.0 / years) - 1.0,
        )
    }

    /// Time-weighted rate of return: compounds per-period holding returns
    /// with each period's cash flow stripped out, then annualizes.
    ///
    /// See <https://en.wikipedia.org/wiki/Time-weighted_return>.
    pub fn twrr(&self, points: &[Snapshot]) -> Result<f64, MetricsError> {
        let (first, last) = boundary(points, 2, "TWRR")?;
        let years = years_between(first, last)?;

        let mut compounded = 1.0;
        for pair in points.windows(2) {
            let prev = &pair[0];
            let cur = &pair[1];
            let holding_return =
                (cur.total_value - (prev.total_value + prev.cash_flow)) / prev.total_value;
            compounded *= 1.0 + holding_return;
        }

        finite("TWRR", compounded.powf(1.0 / years) - 1.0)
    }

    /// Modified Dietz return: a closed-form money-weighted approximation
    /// that weights each cash flow by the fraction of the period remaining
    /// after it occurs.
    ///
    /// The first snapshot's contribution is already embodied in the starting
    /// value, so only later flows count as external flows.
    ///
    /// See <https://en.wikipedia.org/wiki/Modified_Dietz_method>.
    pub fn modified_dietz(&self, points: &[Snapshot]) -> Result<f64, MetricsError> {
        let (first, last) = boundary(points, 2, "Modified Dietz")?;
        let years = years_between(first, last)?;
        let total_days = (last.date - first.date).num_days() as f64;

        let total_flow: f64 = points[1..].iter().map(|p| p.cash_flow).sum();
        let weighted_flow: f64 = points[1..]
            .iter()
            .map(|p| {
                let weight = (last.date - p.date).num_days() as f64 / total_days;
                weight * p.cash_flow
            })
            .sum();

        let gain = (last.total_value - first.total_value - total_flow)
            / (first.total_value + weighted_flow);
        finite("Modified Dietz", (gain + 1.0).powf(1.0 / years) - 1.0)
    }

    /// Money-weighted rate of return: the periodic rate that zeroes the net
    /// present value of all cash flows, solved with the secant method.
    ///
    /// Seeds are fixed at 0.01 and 0, so the solve is deterministic. The
    /// last iterate is returned once `|npv| < 1e-3` or the iteration cap is
    /// reached; a non-finite iterate is reported as
    /// [`MetricsError::NonConvergent`] so callers can discard rather than
    /// report it.
    ///
    /// See <https://en.wikipedia.org/wiki/Internal_rate_of_return>.
    pub fn mwrr(&self, points: &[Snapshot]) -> Result<f64, MetricsError> {
        if points.len() < 2 {
            return Err(MetricsError::InsufficientData {
                metric: "MWRR",
                needed: 2,
                got: points.len(),
            });
        }

        let mut rate_prev = 0.01;
        let mut rate = 0.0;
        let mut npv_prev = npv(points, rate_prev);
        let mut npv_cur = npv(points, rate);

        for _ in 2..SECANT_MAX_ITERATIONS {
            let denominator = npv_cur - npv_prev;
            // A vanishing or non-finite denominator means the iteration can
            // make no further progress; stop on the current iterate.
            if denominator == 0.0 || !denominator.is_finite() {
                break;
            }
            let rate_next = rate - npv_cur * (rate - rate_prev) / denominator;

            rate_prev = rate;
            npv_prev = npv_cur;
            rate = rate_next;
            npv_cur = npv(points, rate);

            if npv_cur.abs() < SECANT_TOLERANCE {
                break;
            }
        }

        if rate.is_finite() {
            Ok(rate)
        } else {
            Err(MetricsError::NonConvergent {
                iterations: SECANT_MAX_ITERATIONS,
            })
        }
    }

    /// Annualized standard deviation of period-over-period value ratios,
    /// using the sample estimator and a `sqrt(12)` monthly-to-annual factor.
    pub fn annualized_stdev(&self, points: &[Snapshot]) -> Result<f64, MetricsError> {
        if points.len() < 3 {
            return Err(MetricsError::InsufficientData {
                metric: "stdev",
                needed: 3,
                got: points.len(),
            });
        }

        let ratios: Vec<f64> = points
            .windows(2)
            .map(|pair| pair[1].total_value / pair[0].total_value)
            .collect();
        let n = ratios.len() as f64;
        let mean = ratios.iter().sum::<f64>() / n;
        let variance = ratios.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

        finite("stdev", variance.sqrt() * MONTHS_PER_YEAR.sqrt())
    }
}

/// Net present value of the snapshot cash flows at monthly-compounded rate
/// `rate`: the discounted terminal value minus the discounted contributions.
fn npv(points: &[Snapshot], rate: f64) -> f64 {
    let terminal_idx = (points.len() - 1) as f64;
    let terminal =
        points[points.len() - 1].total_value / (1.0 + rate).powf(terminal_idx / MONTHS_PER_YEAR);

    let flows: f64 = points
        .iter()
        .enumerate()
        .map(|(idx, point)| point.cash_flow / (1.0 + rate).powf(idx as f64 / MONTHS_PER_YEAR))
        .sum();

    terminal - flows
}

fn boundary<'a>(
    points: &'a [Snapshot],
    needed: usize,
    metric: &'static str,
) -> Result<(&'a Snapshot, &'a Snapshot), MetricsError> {
    if points.len() < needed {
        return Err(MetricsError::InsufficientData {
            metric,
            needed,
            got: points.len(),
        });
    }
    Ok((&points[0], &points[points.len() - 1]))
}

fn years_between(first: &Snapshot, last: &Snapshot) -> Result<f64, MetricsError> {
    let years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
    if years > 0.0 {
        Ok(years)
    } else {
        Err(MetricsError::ZeroDuration)
    }
}

fn finite(metric: &'static str, value: f64) -> Result<f64, MetricsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::NonFinite { metric })
    }
}

/// Degrades a per-metric failure to an absent value, logging why.
fn optional(metric: &'static str, result: Result<f64, MetricsError>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(metric, error = %err, "metric unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};

    const EPS: f64 = 1e-9;

    fn snapshots(values: &[f64], cash_flows: &[f64]) -> Vec<Snapshot> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        values
            .iter()
            .zip(cash_flows)
            .enumerate()
            .map(|(i, (&total_value, &cash_flow))| Snapshot {
                date: start.checked_add_months(Months::new(i as u32)).unwrap(),
                total_value,
                asset_values: vec![total_value],
                cash_flow,
            })
            .collect()
    }

    fn lump_sum(values: &[f64], initial: f64) -> Vec<Snapshot> {
        let mut flows = vec![0.0; values.len()];
        flows[0] = initial;
        snapshots(values, &flows)
    }

    #[test]
    fn cagr_of_a_flat_year_is_zero() {
        let points = lump_sum(&[1200.0; 13], 1200.0);
        let engine = MetricsEngine::new();
        assert!(engine.cagr(&points).unwrap().abs() < EPS);
    }

    #[test]
    fn cagr_is_scale_invariant() {
        let values: Vec<f64> = (0..25).map(|i| 1000.0 + 37.0 * i as f64).collect();
        let doubled: Vec<f64> = values.iter().map(|v| v * 2.0).collect();
        let engine = MetricsEngine::new();

        let base = engine.cagr(&lump_sum(&values, 1000.0)).unwrap();
        let scaled = engine.cagr(&lump_sum(&doubled, 2000.0)).unwrap();
        assert!((base - scaled).abs() < EPS);
    }

    #[test]
    fn cagr_annualizes_a_doubling_over_two_years() {
        let points = lump_sum(&[100.0, 100.0, 200.0], 100.0);
        // Stretch to a two-year span.
        let mut points = points;
        points[2].date = points[0]
            .date
            .checked_add_months(Months::new(24))
            .unwrap();
        let cagr = MetricsEngine::new().cagr(&points).unwrap();
        // (2)^(1/2) - 1, within the 365.25-day year approximation.
        assert!((cagr - (2.0_f64.sqrt() - 1.0)).abs() < 1e-3);
    }

    #[test]
    fn cagr_needs_two_snapshots_and_a_positive_start() {
        let engine = MetricsEngine::new();
        assert!(matches!(
            engine.cagr(&lump_sum(&[100.0], 100.0)),
            Err(MetricsError::InsufficientData { needed: 2, .. })
        ));
        assert!(matches!(
            engine.cagr(&lump_sum(&[0.0, 100.0], 0.0)),
            Err(MetricsError::NonPositiveBaseline { .. })
        ));
    }

    #[test]
    fn twrr_strips_contribution_inflows() {
        // Value only ever grows by the contributions; every holding return
        // is zero, so the time-weighted return is zero.
        let values: Vec<f64> = (1..=13).map(|i| 100.0 * i as f64).collect();
        let mut flows = vec![100.0; 13];
        flows[0] = 100.0;
        let points = snapshots(&values, &flows);
        let twrr = MetricsEngine::new().twrr(&points).unwrap();
        assert!(twrr.abs() < EPS);
    }

    #[test]
    fn modified_dietz_is_zero_without_gains() {
        let values: Vec<f64> = (1..=13).map(|i| 100.0 * i as f64).collect();
        let flows = vec![100.0; 13];
        let points = snapshots(&values, &flows);
        let dietz = MetricsEngine::new().modified_dietz(&points).unwrap();
        assert!(dietz.abs() < 1e-6);
    }

    #[test]
    fn modified_dietz_matches_cagr_without_intermediate_flows() {
        // With no flows after the first step the approximation collapses to
        // plain compound growth.
        let values: Vec<f64> = (0..13).map(|i| 100.0 + 10.0 * i as f64).collect();
        let points = lump_sum(&values, 100.0);
        let engine = MetricsEngine::new();
        let dietz = engine.modified_dietz(&points).unwrap();
        let cagr = engine.cagr(&points).unwrap();
        assert!((dietz - cagr).abs() < EPS);
    }

    #[test]
    fn mwrr_converges_near_zero_on_flat_prices() {
        // 13 monthly points at a constant price with steady contributions.
        let values: Vec<f64> = (1..=13).map(|i| 100.0 * i as f64).collect();
        let flows = vec![100.0; 13];
        let points = snapshots(&values, &flows);

        let mwrr = MetricsEngine::new().mwrr(&points).unwrap();
        assert!(mwrr.is_finite());
        assert!(mwrr.abs() < 1e-6, "expected ~0, got {mwrr}");
    }

    #[test]
    fn mwrr_solve_is_deterministic() {
        let values: Vec<f64> = (0..25).map(|i| 1000.0 + 80.0 * i as f64).collect();
        let mut flows = vec![50.0; 25];
        flows[0] = 1000.0;
        let points = snapshots(&values, &flows);

        let engine = MetricsEngine::new();
        let first = engine.mwrr(&points).unwrap();
        let second = engine.mwrr(&points).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn mwrr_finds_a_positive_rate_for_a_growing_portfolio() {
        // A lump sum that doubles over a year must solve to a clearly
        // positive periodic rate.
        let values: Vec<f64> = (0..13).map(|i| 1000.0 * (1.0 + i as f64 / 12.0)).collect();
        let points = lump_sum(&values, 1000.0);
        let mwrr = MetricsEngine::new().mwrr(&points).unwrap();
        assert!(mwrr > 0.5);
    }

    #[test]
    fn stdev_of_a_flat_series_is_zero() {
        let points = lump_sum(&[1200.0; 13], 1200.0);
        let stdev = MetricsEngine::new().annualized_stdev(&points).unwrap();
        assert!(stdev.abs() < EPS);
    }

    #[test]
    fn stdev_needs_three_snapshots() {
        let points = lump_sum(&[100.0, 110.0], 100.0);
        assert!(matches!(
            MetricsEngine::new().annualized_stdev(&points),
            Err(MetricsError::InsufficientData { needed: 3, .. })
        ));
    }

    #[test]
    fn analyse_gates_cash_flow_metrics_on_the_contribution_run() {
        let engine = MetricsEngine::new();
        let single = lump_sum(&[100.0, 105.0, 110.0, 116.0], 100.0);

        let lump_only = engine.analyse(None, &single).unwrap();
        assert!(lump_only.twrr.is_none());
        assert!(lump_only.mwrr.is_none());
        assert!(lump_only.modified_dietz.is_none());
        assert!(lump_only.stdev.is_some());

        let values: Vec<f64> = (1..=13).map(|i| 100.0 * i as f64).collect();
        let monthly = snapshots(&values, &vec![100.0; 13]);
        let with_contributions = engine.analyse(Some(&monthly), &single).unwrap();
        assert!(with_contributions.twrr.is_some());
        assert!(with_contributions.mwrr.is_some());
        assert!(with_contributions.modified_dietz.is_some());
    }

    #[test]
    fn analyse_degrades_stdev_on_short_series() {
        let single = lump_sum(&[100.0, 110.0], 100.0);
        let analysis = MetricsEngine::new().analyse(None, &single).unwrap();
        assert!(analysis.stdev.is_none());
        assert!(analysis.cagr.is_finite());
    }
}
