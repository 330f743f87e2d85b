use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{sync::Semaphore, task::JoinSet};

use crate::analytics::{concentration, correlation, metrics, round2};
use crate::error::AnalyticsError;
use crate::repo;
use crate::routes::errors;
use crate::state::AppState;

const PERFORMANCE_CACHE_TTL: i64 = 1800;
const RISK_CACHE_TTL: i64 = 1800;
const HOLDINGS_CACHE_TTL: i64 = 3600;

const CORRELATION_NAV_LIMIT: i64 = 100;

const DEFAULT_PERIODS: [&str; 5] = ["1M", "3M", "6M", "1Y", "3Y"];

#[derive(Debug, Deserialize, Default)]
pub struct AnalysisQuery {
    pub days: Option<i64>,
    pub periods: Option<String>,
}

fn lookback_days(q: &AnalysisQuery) -> i64 {
    q.days.unwrap_or(365).clamp(2, 3650)
}

fn period_days(period: &str) -> i64 {
    match period {
        "1M" => 30,
        "3M" => 90,
        "6M" => 180,
        "1Y" => 365,
        "3Y" => 1095,
        "5Y" => 1825,
        _ => 30,
    }
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    period: String,
    fund_return: f64,
    category_average_return: f64,
    rank: i64,
    participant_count: i64,
    percentile: f64,
}

// Cross-sectional comparison: the fund's period return ranked
// against every fund with NAV history in the same window.
async fn comparison_rows(
    pool: &sqlx::AnyPool,
    fund_code: &str,
    periods: &[String],
) -> Result<Vec<ComparisonRow>, AnalyticsError> {
    let mut rows = Vec::with_capacity(periods.len());

    for period in periods {
        let returns = repo::period_returns(pool, period_days(period)).await?;
        let own = returns
            .iter()
            .find(|(code, _)| code == fund_code)
            .map(|(_, r)| *r);

        let Some(fund_return) = own else {
            rows.push(ComparisonRow {
                period: period.clone(),
                fund_return: 0.0,
                category_average_return: 0.0,
                rank: 0,
                participant_count: 0,
                percentile: 0.0,
            });
            continue;
        };

        let n = returns.len() as i64;
        let average = returns.iter().map(|(_, r)| r).sum::<f64>() / n as f64;
        let beaten = returns.iter().filter(|(_, r)| *r <= fund_return).count() as i64;
        let rank = 1 + returns.iter().filter(|(_, r)| *r > fund_return).count() as i64;

        rows.push(ComparisonRow {
            period: period.clone(),
            fund_return: round2(fund_return),
            category_average_return: round2(average),
            rank,
            participant_count: n,
            percentile: round2(beaten as f64 / n as f64 * 100.0),
        });
    }

    Ok(rows)
}

fn parse_periods(q: &AnalysisQuery) -> Vec<String> {
    match q.periods.as_deref() {
        None => DEFAULT_PERIODS.iter().map(|s| s.to_string()).collect(),
        Some(raw) => {
            let list: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if list.is_empty() {
                DEFAULT_PERIODS.iter().map(|s| s.to_string()).collect()
            } else {
                list
            }
        }
    }
}

pub async fn performance(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(fund_code): axum::extract::Path<String>,
    Query(q): Query<AnalysisQuery>,
) -> axum::response::Response {
    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    let days = lookback_days(&q);
    let cache_key = format!("analysis:performance:{fund_code}:{days}");
    if let Some(cached) = state.cache().get(&cache_key) {
        return Json(cached).into_response();
    }

    let mut points = match repo::nav_history(pool, &fund_code, days).await {
        Ok(p) => p,
        Err(e) => return errors::error_response(&state, &e),
    };
    points.reverse(); // newest-first from the repo, metrics want ascending

    let metrics = match metrics::compute(&points) {
        Ok(m) => m,
        Err(e) => return errors::error_response(&state, &e),
    };

    let comparison = match comparison_rows(pool, fund_code.trim(), &parse_periods(&q)).await {
        Ok(rows) => rows,
        Err(e) => return errors::error_response(&state, &e),
    };

    let body = json!({
        "fund_code": fund_code,
        "days": days,
        "total_return": metrics.total_return,
        "annualized_return": metrics.annualized_return,
        "volatility": metrics.volatility,
        "sharpe_ratio": metrics.sharpe_ratio,
        "max_drawdown": metrics.max_drawdown,
        "win_rate": metrics.win_rate,
        "comparison": comparison,
    });
    state.cache().set(&cache_key, body.clone(), PERFORMANCE_CACHE_TTL);

    Json(body).into_response()
}

pub async fn risk(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(fund_code): axum::extract::Path<String>,
    Query(q): Query<AnalysisQuery>,
) -> axum::response::Response {
    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    let days = lookback_days(&q);
    let cache_key = format!("analysis:risk:{fund_code}:{days}");
    if let Some(cached) = state.cache().get(&cache_key) {
        return Json(cached).into_response();
    }

    let mut points = match repo::nav_history(pool, &fund_code, days).await {
        Ok(p) => p,
        Err(e) => return errors::error_response(&state, &e),
    };
    points.reverse();

    let metrics = match metrics::compute(&points) {
        Ok(m) => m,
        Err(e) => return errors::error_response(&state, &e),
    };

    let body = json!({
        "fund_code": fund_code,
        "days": days,
        "volatility": metrics.volatility,
        "max_drawdown": metrics.max_drawdown,
        "sharpe_ratio": metrics.sharpe_ratio,
        "win_rate": metrics.win_rate,
        "annualized_return": metrics.annualized_return,
        "risk_level": metrics::risk_level(metrics.max_drawdown),
    });
    state.cache().set(&cache_key, body.clone(), RISK_CACHE_TTL);

    Json(body).into_response()
}

pub async fn holdings(
    axum::extract::State(state): axum::extract::State<AppState>,
    axum::extract::Path(fund_code): axum::extract::Path<String>,
) -> axum::response::Response {
    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    let cache_key = format!("analysis:holdings:{fund_code}");
    if let Some(cached) = state.cache().get(&cache_key) {
        return Json(cached).into_response();
    }

    let rows = match repo::holdings(pool, &fund_code, 200).await {
        Ok(rows) => rows,
        Err(e) => return errors::error_response(&state, &e),
    };

    let result = concentration::analyze(&rows);
    let body = json!({
        "fund_code": fund_code,
        "top5_ratio": result.top5_ratio,
        "top10_ratio": result.top10_ratio,
        "industry_breakdown": result.industry_breakdown,
        "concentration_level": concentration::concentration_level(result.top10_ratio),
    });
    state.cache().set(&cache_key, body.clone(), HOLDINGS_CACHE_TTL);

    Json(body).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CorrelationRequest {
    pub fund_codes: Vec<String>,
}

pub async fn correlation(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(req): Json<CorrelationRequest>,
) -> axum::response::Response {
    let codes: Vec<String> = req
        .fund_codes
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if codes.len() < 2 || codes.len() > 10 {
        return errors::error_response(
            &state,
            &AnalyticsError::InvalidRequest(
                "correlation requires between 2 and 10 fund codes".to_string(),
            ),
        );
    }

    let Some(pool) = state.pool() else {
        return errors::database_not_configured();
    };

    // Bounded fan-out so a wide request cannot swamp the database.
    let sem = Arc::new(Semaphore::new(5));
    let mut set: JoinSet<(usize, Result<Vec<f64>, AnalyticsError>)> = JoinSet::new();
    for (idx, code) in codes.iter().enumerate() {
        let pool = pool.clone();
        let code = code.clone();
        let sem = sem.clone();
        set.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore");
            (idx, repo::nav_window(&pool, &code, CORRELATION_NAV_LIMIT).await)
        });
    }

    let mut windows: Vec<Vec<f64>> = vec![Vec::new(); codes.len()];
    while let Some(joined) = set.join_next().await {
        let Ok((idx, result)) = joined else { continue };
        match result {
            Ok(window) => windows[idx] = window,
            Err(e) => return errors::error_response(&state, &e),
        }
    }

    let matrix = correlation::correlation_matrix(&windows);
    Json(json!({
        "fund_codes": codes,
        "correlation_matrix": matrix,
    }))
    .into_response()
}
