use serde::Serialize;
use serde_json::Value;

use crate::error::{AnalyticsError, AnalyticsResult};

#[derive(Debug, Clone, Serialize)]
pub struct RealtimeEstimate {
    pub fund_code: String,
    pub estimate_nav: f64,
    /// Intraday change, percent.
    pub estimate_growth: f64,
    pub estimate_time: Option<String>,
}

pub fn build_client() -> AnalyticsResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent("fund-analytics/0.1")
        .build()
        .map_err(|e| AnalyticsError::Upstream(format!("build http client: {e}")))
}

// Providers are inconsistent about numeric fields; accept either a
// JSON number or a numeric string.
fn num_field(body: &Value, key: &str) -> Option<f64> {
    match body.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Fetches `{base_url}/estimate/{fund_code}`. A 404 or a payload
/// without an estimate value means the provider has nothing for this
/// code (`Ok(None)`); transport failures surface as `Upstream`.
pub async fn fetch_estimate(
    client: &reqwest::Client,
    base_url: &str,
    fund_code: &str,
) -> AnalyticsResult<Option<RealtimeEstimate>> {
    let url = format!(
        "{}/estimate/{}",
        base_url.trim_end_matches('/'),
        fund_code.trim()
    );

    let resp = client
        .get(&url)
        .send()
        .await
        .map_err(|e| AnalyticsError::Upstream(format!("estimate fetch failed: {e}")))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !resp.status().is_success() {
        return Err(AnalyticsError::Upstream(format!(
            "estimate fetch returned {}",
            resp.status()
        )));
    }

    let body: Value = resp
        .json()
        .await
        .map_err(|e| AnalyticsError::Upstream(format!("estimate payload not json: {e}")))?;

    let Some(estimate_nav) = num_field(&body, "estimate_nav") else {
        return Ok(None);
    };
    let estimate_growth = num_field(&body, "estimate_growth").unwrap_or(0.0);
    let estimate_time = body
        .get("estimate_time")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(Some(RealtimeEstimate {
        fund_code: fund_code.trim().to_string(),
        estimate_nav,
        estimate_growth,
        estimate_time,
    }))
}
