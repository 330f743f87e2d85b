use crate::error::{AnalyticsError, AnalyticsResult};

/// Period-over-period returns; `InvalidSeries` on any non-positive
/// or non-finite value.
pub fn daily_returns(navs: &[f64]) -> AnalyticsResult<Vec<f64>> {
    for &v in navs {
        if !v.is_finite() || v <= 0.0 {
            return Err(AnalyticsError::InvalidSeries(format!(
                "nav value {v} is not a positive number"
            )));
        }
    }
    if navs.len() < 2 {
        return Ok(Vec::new());
    }
    Ok(navs.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
}

/// Drawdown at each point relative to the running peak, as a fraction.
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut peak = f64::NEG_INFINITY;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            out.push((peak - v) / peak);
        } else {
            out.push(0.0);
        }
    }
    out
}

/// Largest peak-to-trough decline, as a percentage.
pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_curve(values).into_iter().fold(0.0, f64::max) * 100.0
}

pub fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() >= 2 && first != 0.0 => {
            (last - first) / first * 100.0
        }
        _ => 0.0,
    }
}
