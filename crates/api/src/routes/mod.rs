use axum::Router;

use crate::state::AppState;

pub mod analysis;
pub mod errors;
pub mod estimates;
pub mod health;
pub mod valuation;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(health::health))
        .route(
            "/api/funds/{fund_code}/analysis/performance",
            axum::routing::get(analysis::performance),
        )
        .route(
            "/api/funds/{fund_code}/analysis/risk",
            axum::routing::get(analysis::risk),
        )
        .route(
            "/api/funds/{fund_code}/analysis/holdings",
            axum::routing::get(analysis::holdings),
        )
        .route(
            "/api/analysis/correlation",
            axum::routing::post(analysis::correlation),
        )
        .route(
            "/api/valuation/backtest",
            axum::routing::post(valuation::run_backtest),
        )
        .route(
            "/api/indexes/{index_code}/percentile",
            axum::routing::get(valuation::percentile),
        )
        .route(
            "/api/funds/batch_estimate",
            axum::routing::post(estimates::batch),
        )
        .with_state(state)
}
