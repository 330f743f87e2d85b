use api::analytics::metrics::{self, NavPoint, PerformanceMetrics};
use chrono::NaiveDate;

fn points(navs: &[f64]) -> Vec<NavPoint> {
    navs.iter()
        .enumerate()
        .map(|(i, &nav)| NavPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            unit_nav: nav,
            accumulated_nav: None,
        })
        .collect()
}

#[test]
fn fewer_than_two_points_yields_all_zeros() {
    let out = metrics::compute(&[]).expect("empty ok");
    assert_eq!(out, PerformanceMetrics::ZERO);

    let out = metrics::compute(&points(&[1.0])).expect("single ok");
    assert_eq!(out, PerformanceMetrics::ZERO);
}

#[test]
fn total_return_matches_first_to_last() {
    let out = metrics::compute(&points(&[1.0, 1.05, 1.2])).expect("metrics");
    assert!((out.total_return - 20.0).abs() < 1e-9);
}

#[test]
fn metrics_invariant_under_uniform_scaling() {
    let base = points(&[1.0, 1.02, 0.99, 1.05, 1.08]);
    let scaled = points(&[3.0, 3.06, 2.97, 3.15, 3.24]);

    let a = metrics::compute(&base).expect("base metrics");
    let b = metrics::compute(&scaled).expect("scaled metrics");

    assert_eq!(a.total_return, b.total_return);
    assert_eq!(a.annualized_return, b.annualized_return);
    assert_eq!(a.volatility, b.volatility);
    assert_eq!(a.max_drawdown, b.max_drawdown);
    assert_eq!(a.win_rate, b.win_rate);
}

#[test]
fn flat_series_has_zero_volatility_and_zero_sharpe() {
    let out = metrics::compute(&points(&[1.0, 1.0, 1.0, 1.0])).expect("metrics");
    assert_eq!(out.volatility, 0.0);
    assert_eq!(out.sharpe_ratio, 0.0);
    assert_eq!(out.win_rate, 0.0);
}

#[test]
fn win_rate_counts_positive_days() {
    // returns: +, -, + -> 2 of 3
    let out = metrics::compute(&points(&[1.0, 1.1, 1.05, 1.2])).expect("metrics");
    assert!((out.win_rate - 66.67).abs() < 1e-9);
}

#[test]
fn annualized_return_zero_when_no_elapsed_days() {
    let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let same_day = vec![
        NavPoint {
            date,
            unit_nav: 1.0,
            accumulated_nav: None,
        },
        NavPoint {
            date,
            unit_nav: 1.2,
            accumulated_nav: None,
        },
    ];
    let out = metrics::compute(&same_day).expect("metrics");
    assert_eq!(out.annualized_return, 0.0);
    assert!((out.total_return - 20.0).abs() < 1e-9);
}

#[test]
fn max_drawdown_reported_as_percent() {
    let out = metrics::compute(&points(&[1.0, 1.1, 1.0])).expect("metrics");
    assert!((out.max_drawdown - 9.09).abs() < 1e-9);
}

#[test]
fn risk_level_thresholds() {
    assert_eq!(metrics::risk_level(25.0), "high");
    assert_eq!(metrics::risk_level(20.0), "medium");
    assert_eq!(metrics::risk_level(10.1), "medium");
    assert_eq!(metrics::risk_level(10.0), "low");
    assert_eq!(metrics::risk_level(0.0), "low");
}
