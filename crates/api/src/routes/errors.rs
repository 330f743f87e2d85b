use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::AnalyticsError;
use crate::state::AppState;

/// Caller-facing error classes keep their message; collaborator
/// failures are logged and masked unless the debug flag is set.
pub fn error_response(state: &AppState, err: &AnalyticsError) -> axum::response::Response {
    let status = err.status();
    let message = if err.is_public() {
        tracing::warn!(error = %err, "request rejected");
        err.to_string()
    } else {
        tracing::error!(error = %err, "request failed");
        if state.config().get_bool("debug", false) {
            err.to_string()
        } else {
            match err {
                AnalyticsError::Upstream(_) => "upstream data provider unavailable".to_string(),
                _ => "internal server error".to_string(),
            }
        }
    };

    (status, Json(json!({ "error": message }))).into_response()
}

pub fn database_not_configured() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database not configured" })),
    )
        .into_response()
}
