use api::analytics::backtest::{self, BacktestConfig, Frequency, ValuationPoint};
use api::error::AnalyticsError;
use chrono::NaiveDate;

fn config(frequency: Frequency, duration_months: u32) -> BacktestConfig {
    BacktestConfig {
        index_code: "000300".to_string(),
        initial_amount: 10_000.0,
        frequency,
        duration_months,
        low_percentile: 30.0,
        high_percentile: 70.0,
        low_multiple: 1.5,
        high_multiple: 0.5,
    }
}

fn history(percentile: f64, len: usize) -> Vec<ValuationPoint> {
    (0..len)
        .map(|i| ValuationPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            pe_ratio: 12.0,
            percentile: Some(percentile),
        })
        .collect()
}

#[test]
fn no_tilt_matches_uniform_baseline() {
    let mut cfg = config(Frequency::Daily, 6);
    cfg.low_multiple = 1.0;
    cfg.high_multiple = 1.0;

    let out = backtest::run(&cfg, &history(10.0, 200)).expect("backtest");
    assert_eq!(out.total_return, out.baseline_return);
}

#[test]
fn low_percentile_tilt_invests_more_than_baseline() {
    let cfg = config(Frequency::Daily, 6);
    // every day reads as cheap -> every tick invests low_multiple
    let out = backtest::run(&cfg, &history(10.0, 200)).expect("backtest");
    assert!(out.total_return > out.baseline_return);
    assert!((out.total_return - 150.0).abs() < 1e-9);
    assert!((out.baseline_return - 100.0).abs() < 1e-9);
}

#[test]
fn high_percentile_tilt_invests_less_than_baseline() {
    let cfg = config(Frequency::Daily, 6);
    let out = backtest::run(&cfg, &history(90.0, 200)).expect("backtest");
    assert!(out.total_return < out.baseline_return);
    assert!((out.total_return - 50.0).abs() < 1e-9);
}

#[test]
fn mid_percentile_gets_no_tilt() {
    let cfg = config(Frequency::Daily, 6);
    let out = backtest::run(&cfg, &history(50.0, 200)).expect("backtest");
    assert_eq!(out.total_return, out.baseline_return);
}

#[test]
fn missing_percentile_defaults_to_no_tilt() {
    let cfg = config(Frequency::Daily, 3);
    let mut hist = history(50.0, 100);
    for row in &mut hist {
        row.percentile = None;
    }
    let out = backtest::run(&cfg, &hist).expect("backtest");
    assert_eq!(out.total_return, out.baseline_return);
}

#[test]
fn tick_counts_follow_frequency_stride() {
    // 1 month of history at percentile 10: all ticks invest 1.5x base.
    // Return is 150% regardless of tick count, but weekly/monthly use
    // rows 0, 7, 14... so short histories only cover early ticks.
    let cfg = config(Frequency::Weekly, 1);
    // window 30 days / stride 7 = 4 ticks; history covers rows 0..30
    let out = backtest::run(&cfg, &history(10.0, 30)).expect("backtest");
    assert!((out.total_return - 150.0).abs() < 1e-9);

    let cfg = config(Frequency::Monthly, 3);
    // 3 ticks at rows 0, 30, 60
    let out = backtest::run(&cfg, &history(10.0, 90)).expect("backtest");
    assert!((out.total_return - 150.0).abs() < 1e-9);
}

#[test]
fn short_history_skips_uncovered_ticks() {
    let cfg = config(Frequency::Daily, 6);
    // only 90 of 180 ticks have a valuation row
    let out = backtest::run(&cfg, &history(10.0, 90)).expect("backtest");
    assert!((out.total_return - 75.0).abs() < 1e-9);
}

#[test]
fn empty_history_yields_zero_result() {
    let cfg = config(Frequency::Daily, 6);
    let out = backtest::run(&cfg, &[]).expect("backtest");
    assert_eq!(out.total_return, 0.0);
    assert_eq!(out.annualized_return, 0.0);
    assert_eq!(out.max_drawdown, 0.0);
    assert_eq!(out.sharpe_ratio, 0.0);
    assert_eq!(out.baseline_return, 0.0);
}

#[test]
fn additive_value_series_never_draws_down() {
    let cfg = config(Frequency::Daily, 6);
    let out = backtest::run(&cfg, &history(90.0, 200)).expect("backtest");
    assert_eq!(out.max_drawdown, 0.0);
}

#[test]
fn twelve_month_run_annualizes_to_total_return() {
    let mut cfg = config(Frequency::Monthly, 12);
    cfg.low_multiple = 1.0;
    cfg.high_multiple = 1.0;
    let out = backtest::run(&cfg, &history(50.0, 400)).expect("backtest");
    assert_eq!(out.annualized_return, out.total_return);
}

#[test]
fn invalid_configs_are_rejected() {
    let mut cfg = config(Frequency::Daily, 6);
    cfg.initial_amount = 0.0;
    assert!(matches!(
        backtest::run(&cfg, &history(50.0, 10)),
        Err(AnalyticsError::InvalidRequest(_))
    ));

    let mut cfg = config(Frequency::Daily, 6);
    cfg.duration_months = 0;
    assert!(matches!(
        backtest::run(&cfg, &history(50.0, 10)),
        Err(AnalyticsError::InvalidRequest(_))
    ));

    let mut cfg = config(Frequency::Daily, 6);
    cfg.low_percentile = 70.0;
    cfg.high_percentile = 30.0;
    assert!(matches!(
        backtest::run(&cfg, &history(50.0, 10)),
        Err(AnalyticsError::InvalidRequest(_))
    ));

    let mut cfg = config(Frequency::Daily, 6);
    cfg.high_multiple = -1.0;
    assert!(matches!(
        backtest::run(&cfg, &history(50.0, 10)),
        Err(AnalyticsError::InvalidRequest(_))
    ));

    let mut cfg = config(Frequency::Daily, 6);
    cfg.index_code = "  ".to_string();
    assert!(matches!(
        backtest::run(&cfg, &history(50.0, 10)),
        Err(AnalyticsError::InvalidRequest(_))
    ));
}
