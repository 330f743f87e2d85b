use chrono::NaiveDate;
use serde::Serialize;

use super::{returns, round2};
use crate::error::AnalyticsResult;

pub const RISK_FREE_RATE: f64 = 0.03;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub unit_nav: f64,
    pub accumulated_nav: Option<f64>,
}

/// All fields are percentages rounded to two decimals, except
/// `sharpe_ratio` which is a unitless ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
}

impl PerformanceMetrics {
    pub const ZERO: PerformanceMetrics = PerformanceMetrics {
        total_return: 0.0,
        annualized_return: 0.0,
        volatility: 0.0,
        sharpe_ratio: 0.0,
        max_drawdown: 0.0,
        win_rate: 0.0,
    };
}

/// Population standard deviation (divide by N, not N-1), as a fraction.
pub fn population_volatility(daily: &[f64]) -> f64 {
    if daily.is_empty() {
        return 0.0;
    }
    let n = daily.len() as f64;
    let mean = daily.iter().sum::<f64>() / n;
    let var = daily.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    var.sqrt()
}

/// Sharpe from an annualized return and a daily volatility, both in
/// percent; zero volatility yields zero.
pub fn sharpe_ratio(annualized_return_pct: f64, volatility_pct: f64) -> f64 {
    let annualized_vol = volatility_pct * TRADING_DAYS_PER_YEAR.sqrt();
    if annualized_vol > 0.0 {
        (annualized_return_pct / 100.0 - RISK_FREE_RATE) / (annualized_vol / 100.0)
    } else {
        0.0
    }
}

/// Metrics over NAV points ordered ascending by date. Fewer than two
/// points is a degenerate case (all zeros), not an error.
pub fn compute(points: &[NavPoint]) -> AnalyticsResult<PerformanceMetrics> {
    if points.len() < 2 {
        return Ok(PerformanceMetrics::ZERO);
    }

    let navs: Vec<f64> = points.iter().map(|p| p.unit_nav).collect();
    let daily = returns::daily_returns(&navs)?;

    let first = navs[0];
    let last = navs[navs.len() - 1];
    let total_return = returns::total_return(&navs);

    let actual_days = (points[points.len() - 1].date - points[0].date).num_days();
    let annualized_return = if actual_days > 0 {
        ((last / first).powf(365.0 / actual_days as f64) - 1.0) * 100.0
    } else {
        0.0
    };

    let volatility = population_volatility(&daily) * 100.0;
    let sharpe = sharpe_ratio(annualized_return, volatility);
    let max_drawdown = returns::max_drawdown(&navs);

    let win_days = daily.iter().filter(|r| **r > 0.0).count();
    let win_rate = win_days as f64 / daily.len() as f64 * 100.0;

    Ok(PerformanceMetrics {
        total_return: round2(total_return),
        annualized_return: round2(annualized_return),
        volatility: round2(volatility),
        sharpe_ratio: round2(sharpe),
        max_drawdown: round2(max_drawdown),
        win_rate: round2(win_rate),
    })
}

pub fn risk_level(max_drawdown_pct: f64) -> &'static str {
    if max_drawdown_pct > 20.0 {
        "high"
    } else if max_drawdown_pct > 10.0 {
        "medium"
    } else {
        "low"
    }
}
