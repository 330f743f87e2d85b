pub mod backtest;
pub mod concentration;
pub mod correlation;
pub mod metrics;
pub mod returns;

/// Round to two decimals for presentation.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
