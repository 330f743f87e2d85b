use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{metrics, returns, round2};
use crate::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Spacing between investment ticks, in valuation rows.
    fn stride_days(self) -> usize {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    pub index_code: String,
    pub initial_amount: f64,
    pub frequency: Frequency,
    pub duration_months: u32,
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub low_multiple: f64,
    pub high_multiple: f64,
}

impl BacktestConfig {
    pub fn window_days(&self) -> usize {
        self.duration_months as usize * 30
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.index_code.trim().is_empty() {
            return Err(AnalyticsError::InvalidRequest(
                "index_code is required".to_string(),
            ));
        }
        if !self.initial_amount.is_finite() || self.initial_amount <= 0.0 {
            return Err(AnalyticsError::InvalidRequest(
                "initial_amount must be positive".to_string(),
            ));
        }
        if self.duration_months == 0 {
            return Err(AnalyticsError::InvalidRequest(
                "duration_months must be positive".to_string(),
            ));
        }
        if self.low_percentile >= self.high_percentile {
            return Err(AnalyticsError::InvalidRequest(
                "low_percentile must be below high_percentile".to_string(),
            ));
        }
        if self.low_multiple <= 0.0 || self.high_multiple <= 0.0 {
            return Err(AnalyticsError::InvalidRequest(
                "multiples must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ValuationPoint {
    pub date: NaiveDate,
    pub pe_ratio: f64,
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    /// Return of the same schedule without the percentile tilt.
    pub baseline_return: f64,
}

struct Simulation {
    values: Vec<f64>,
    total_return: f64,
}

fn tilt_multiplier(percentile: f64, config: &BacktestConfig, low: f64, high: f64) -> f64 {
    if percentile < config.low_percentile {
        low
    } else if percentile > config.high_percentile {
        high
    } else {
        1.0
    }
}

/// Percentile-tilted periodic investment over a chronological
/// valuation history.
///
/// Value accrues additively: each tick adds its invested amount and
/// prior contributions are not revalued by subsequent price moves.
fn simulate(
    config: &BacktestConfig,
    history: &[ValuationPoint],
    low_multiple: f64,
    high_multiple: f64,
) -> Simulation {
    let stride = config.frequency.stride_days();
    let ticks = (config.window_days() / stride).max(1);
    let base_amount = config.initial_amount / ticks as f64;

    let mut current_value = config.initial_amount;
    let mut values = Vec::with_capacity(ticks + 1);
    values.push(current_value);

    for tick in 0..ticks {
        let Some(row) = history.get(tick * stride) else {
            continue;
        };
        let percentile = row.percentile.unwrap_or(50.0);
        let multiplier = tilt_multiplier(percentile, config, low_multiple, high_multiple);
        current_value += base_amount * multiplier;
        values.push(current_value);
    }

    let total_return =
        (current_value - config.initial_amount) / config.initial_amount * 100.0;
    Simulation {
        values,
        total_return,
    }
}

/// Runs the backtest over `history` ordered oldest-first; risk
/// metrics apply the performance formulas to the tick value series.
pub fn run(config: &BacktestConfig, history: &[ValuationPoint]) -> AnalyticsResult<BacktestResult> {
    config.validate()?;

    let tilted = simulate(config, history, config.low_multiple, config.high_multiple);
    let baseline = simulate(config, history, 1.0, 1.0);

    let years = config.duration_months as f64 / 12.0;
    let annualized_return = ((1.0 + tilted.total_return / 100.0).powf(1.0 / years) - 1.0) * 100.0;

    let daily = returns::daily_returns(&tilted.values)?;
    let volatility_pct = metrics::population_volatility(&daily) * 100.0;
    let sharpe = metrics::sharpe_ratio(annualized_return, volatility_pct);
    let max_drawdown = returns::max_drawdown(&tilted.values);

    Ok(BacktestResult {
        total_return: round2(tilted.total_return),
        annualized_return: round2(annualized_return),
        max_drawdown: round2(max_drawdown),
        sharpe_ratio: round2(sharpe),
        baseline_return: round2(baseline.total_return),
    })
}
