use std::sync::Arc;

use axum::{response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::error::AnalyticsError;
use crate::estimates;
use crate::routes::errors;
use crate::state::AppState;

const MAX_BATCH_CODES: usize = 50;

#[derive(Debug, Deserialize)]
pub struct BatchEstimateRequest {
    pub fund_codes: Vec<String>,
}

/// Realtime estimates for a batch of funds; a code whose upstream
/// fetch fails degrades to a null entry instead of failing the batch.
pub async fn batch(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(req): Json<BatchEstimateRequest>,
) -> axum::response::Response {
    let codes: Vec<String> = req
        .fund_codes
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if codes.is_empty() || codes.len() > MAX_BATCH_CODES {
        return errors::error_response(
            &state,
            &AnalyticsError::InvalidRequest(format!(
                "batch estimate requires between 1 and {MAX_BATCH_CODES} fund codes"
            )),
        );
    }

    let Some(base_url) = state.config().get_string("estimate_base_url") else {
        return errors::error_response(
            &state,
            &AnalyticsError::Upstream("estimate provider not configured".to_string()),
        );
    };

    let ttl = state.config().get_i64("estimate_cache_ttl", 300).max(0);

    let mut results: Vec<Option<Value>> = vec![None; codes.len()];
    let mut need_fetch: Vec<(usize, String)> = Vec::new();
    for (idx, code) in codes.iter().enumerate() {
        match state.cache().get(&format!("estimate:{code}")) {
            Some(mut cached) => {
                if let Some(obj) = cached.as_object_mut() {
                    obj.insert("from_cache".to_string(), Value::Bool(true));
                }
                results[idx] = Some(cached);
            }
            None => need_fetch.push((idx, code.clone())),
        }
    }

    if !need_fetch.is_empty() {
        let client = match estimates::build_client() {
            Ok(c) => c,
            Err(e) => return errors::error_response(&state, &e),
        };

        let sem = Arc::new(Semaphore::new(5));
        let mut set: JoinSet<(
            usize,
            String,
            Result<Option<estimates::RealtimeEstimate>, AnalyticsError>,
        )> = JoinSet::new();
        for (idx, code) in need_fetch {
            let client = client.clone();
            let base_url = base_url.clone();
            let sem = sem.clone();
            set.spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore");
                let fetched = estimates::fetch_estimate(&client, &base_url, &code).await;
                (idx, code, fetched)
            });
        }

        while let Some(joined) = set.join_next().await {
            let Ok((idx, code, fetched)) = joined else {
                continue;
            };
            let entry = match fetched {
                Ok(Some(est)) => {
                    let value = json!({
                        "fund_code": est.fund_code,
                        "estimate_nav": est.estimate_nav,
                        "estimate_growth": est.estimate_growth,
                        "estimate_time": est.estimate_time,
                        "from_cache": false,
                    });
                    state.cache().set(&format!("estimate:{code}"), value.clone(), ttl);
                    value
                }
                Ok(None) => json!({
                    "fund_code": code,
                    "estimate": Value::Null,
                    "error": "no estimate available",
                }),
                Err(e) => {
                    tracing::warn!(fund_code = %code, error = %e, "estimate fetch failed");
                    json!({
                        "fund_code": code,
                        "estimate": Value::Null,
                        "error": "upstream fetch failed",
                    })
                }
            };
            results[idx] = Some(entry);
        }
    }

    let estimates: Vec<Value> = results
        .into_iter()
        .map(|v| v.unwrap_or(Value::Null))
        .collect();

    Json(json!({ "estimates": estimates })).into_response()
}
