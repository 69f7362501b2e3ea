use backtester::{BacktestError, Backtester};
use chrono::{Months, NaiveDate};
use core_types::{Portfolio, PortfolioAsset, PricePoint, PriceSeries};

fn monthly_series(start: NaiveDate, values: &[f64]) -> PriceSeries {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| PricePoint {
            date: start.checked_add_months(Months::new(i as u32)).unwrap(),
            value,
        })
        .collect()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}

fn two_asset_request() -> Portfolio {
    let growth: Vec<f64> = (0..37).map(|i| 100.0 * 1.005_f64.powi(i)).collect();
    let flat: Vec<f64> = (0..37).map(|i| 50.0 + (i % 3) as f64).collect();
    Portfolio {
        assets: vec![
            PortfolioAsset {
                allocation: 0.6,
                fee: 0.002,
                series: monthly_series(start_date(), &growth),
            },
            PortfolioAsset {
                allocation: 0.4,
                fee: 0.001,
                series: monthly_series(start_date(), &flat),
            },
        ],
        rebalancing_months: Some(6),
        investment_duration_years: Some(1),
        initial_cash: 10_000.0,
        monthly_cash: 500.0,
        start_date: None,
        end_date: None,
    }
}

#[test]
fn full_backtest_produces_a_complete_report() {
    let report = Backtester::new(two_asset_request()).run().unwrap();

    assert_eq!(report.snapshots.len(), 37);
    assert!(report.analysis.cagr.is_finite());
    assert!(report.analysis.twrr.is_some());
    assert!(report.analysis.mwrr.is_some());
    assert!(report.analysis.modified_dietz.is_some());
    assert!(report.analysis.stdev.is_some());

    // 37 aligned points, 12-month windows: at most 25 entries.
    let rolling = report.rolling.expect("duration was set");
    assert!(!rolling.is_empty());
    assert!(rolling.len() <= 25);
    assert!(
        rolling
            .windows(2)
            .all(|pair| pair[0].start_date < pair[1].start_date)
    );
}

#[test]
fn report_snapshots_carry_the_contribution_cash_flows() {
    let report = Backtester::new(two_asset_request()).run().unwrap();
    assert_eq!(report.snapshots[0].cash_flow, 10_000.0);
    assert!(report.snapshots[1..].iter().all(|s| s.cash_flow == 500.0));
}

#[test]
fn lump_sum_request_omits_cash_flow_metrics() {
    let mut request = two_asset_request();
    request.monthly_cash = 0.0;
    request.investment_duration_years = None;

    let report = Backtester::new(request).run().unwrap();
    assert!(report.analysis.twrr.is_none());
    assert!(report.analysis.mwrr.is_none());
    assert!(report.analysis.modified_dietz.is_none());
    assert!(report.analysis.cagr.is_finite());
    assert!(report.rolling.is_none());
}

#[test]
fn misaligned_series_abort_the_backtest() {
    let mut request = two_asset_request();
    // Same endpoints, one sample missing in the middle of the second asset.
    request.assets[1].series.remove(18);

    match Backtester::new(request).run() {
        Err(BacktestError::Aligner(aligner::AlignerError::MisalignedSeries { counts })) => {
            assert_eq!(counts, vec![36, 37]);
        }
        other => panic!("expected a misalignment failure, got {other:?}"),
    }
}

#[test]
fn flat_single_asset_year_has_zero_growth_and_no_variance() {
    let request = Portfolio {
        assets: vec![PortfolioAsset {
            allocation: 1.0,
            fee: 0.0,
            series: monthly_series(start_date(), &[1.0; 13]),
        }],
        rebalancing_months: None,
        investment_duration_years: None,
        initial_cash: 1200.0,
        monthly_cash: 0.0,
        start_date: None,
        end_date: None,
    };

    let report = Backtester::new(request).run().unwrap();
    assert!(report.analysis.cagr.abs() < 1e-9);
    assert!(report.analysis.stdev.unwrap().abs() < 1e-9);
}

#[test]
fn caller_date_bounds_clamp_the_simulated_range() {
    let mut request = two_asset_request();
    request.investment_duration_years = None;
    request.start_date = Some(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
    request.end_date = Some(NaiveDate::from_ymd_opt(2016, 12, 1).unwrap());

    let report = Backtester::new(request).run().unwrap();
    assert_eq!(report.snapshots.len(), 12);
    assert_eq!(
        report.snapshots[0].date,
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
    );
}

#[test]
fn invalid_requests_are_rejected_before_alignment() {
    let mut no_assets = two_asset_request();
    no_assets.assets.clear();
    assert!(matches!(
        Backtester::new(no_assets).run(),
        Err(BacktestError::InvalidRequest(_))
    ));

    let mut no_cash = two_asset_request();
    no_cash.initial_cash = 0.0;
    no_cash.monthly_cash = 0.0;
    assert!(matches!(
        Backtester::new(no_cash).run(),
        Err(BacktestError::InvalidRequest(_))
    ));

    let mut bad_fee = two_asset_request();
    bad_fee.assets[0].fee = 1.0;
    assert!(matches!(
        Backtester::new(bad_fee).run(),
        Err(BacktestError::InvalidRequest(_))
    ));
}
