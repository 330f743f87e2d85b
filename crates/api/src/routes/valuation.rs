use axum::{extract::Query, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::analytics::backtest::{self, BacktestConfig};
use crate::analytics::round2;
use crate::error::AnalyticsError;
use crate::repo;
use crate::routes::errors;
use crate::state::AppState;

pub async fn run_backtest(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(config): Json<BacktestConfig>,
) -> axum::response::Response {
    if let Err(e) = config.validate() {
        return errors::error_response(&state, &e);
    }

    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    let index = match repo::index_by_code(pool, &config.index_code).await {
        Ok(Some(index)) => index,
        Ok(None) => {
            return errors::error_response(
                &state,
                &AnalyticsError::NotFound(format!("index {} not found", config.index_code)),
            );
        }
        Err(e) => return errors::error_response(&state, &e),
    };

    let mut history =
        match repo::valuation_history(pool, &index.id, config.window_days() as i64).await {
            Ok(rows) => rows,
            Err(e) => return errors::error_response(&state, &e),
        };
    history.reverse(); // stored newest-first, the simulation walks chronologically

    let result = match backtest::run(&config, &history) {
        Ok(r) => r,
        Err(e) => return errors::error_response(&state, &e),
    };

    Json(json!({
        "index_code": index.index_code,
        "index_name": index.index_name,
        "result": result,
    }))
    .into_response()
}

#[derive(Debug, Deserialize, Default)]
pub struct PercentileQuery {
    pub pe: Option<f64>,
    pub years: Option<i64>,
}

fn valuation_status(percentile: f64) -> &'static str {
    if percentile < 30.0 {
        "undervalued"
    } else if percentile > 70.0 {
        "overvalued"
    } else {
        "normal"
    }
}

/// With no explicit `pe` the latest recorded ratio is used.
pub async fn percentile(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(index_code): axum::extract::Path<String>,
    Query(q): Query<PercentileQuery>,
) -> axum::response::Response {
    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    let index = match repo::index_by_code(pool, &index_code).await {
        Ok(Some(index)) => index,
        Ok(None) => {
            return errors::error_response(
                &state,
                &AnalyticsError::NotFound(format!("index {index_code} not found")),
            );
        }
        Err(e) => return errors::error_response(&state, &e),
    };

    let pe = match q.pe {
        Some(pe) if pe.is_finite() && pe > 0.0 => pe,
        Some(_) => {
            return errors::error_response(
                &state,
                &AnalyticsError::InvalidRequest("pe must be a positive number".to_string()),
            );
        }
        None => match repo::latest_valuation(pool, &index.id).await {
            Ok(Some(latest)) => latest.pe_ratio,
            Ok(None) => {
                return errors::error_response(
                    &state,
                    &AnalyticsError::NotFound(format!(
                        "index {index_code} has no valuation history"
                    )),
                );
            }
            Err(e) => return errors::error_response(&state, &e),
        },
    };

    let years = q.years.unwrap_or(5).clamp(1, 20);
    let percentile = match repo::pe_percentile(pool, &index.id, pe, years).await {
        Ok(p) => p,
        Err(e) => return errors::error_response(&state, &e),
    };

    Json(json!({
        "index_code": index.index_code,
        "index_name": index.index_name,
        "pe_ratio": pe,
        "years": years,
        "percentile": round2(percentile),
        "valuation_status": valuation_status(percentile),
    }))
    .into_response()
}
