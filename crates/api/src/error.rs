use axum::http::StatusCode;
use thiserror::Error;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Failure taxonomy for the analytics core.
///
/// Insufficient history is never an error: those paths return
/// zero-valued degenerate results instead. Errors are reserved for
/// structurally invalid input, missing entities and failed
/// collaborators.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A NAV/value series contains an entry the ratio math cannot
    /// handle (non-positive or non-finite price).
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    /// Caller-level contract violation (wrong fund count, malformed
    /// config, non-positive amounts).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced fund/index has no matching data.
    #[error("not found: {0}")]
    NotFound(String),

    /// Third-party data fetch failed. Distinct from "insufficient
    /// data": this means unknown, not known-zero.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AnalyticsError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyticsError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyticsError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalyticsError::InvalidSeries(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AnalyticsError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AnalyticsError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to show to callers without the
    /// debug flag. Collaborator failures may leak connection details.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidRequest(_)
                | AnalyticsError::NotFound(_)
                | AnalyticsError::InvalidSeries(_)
        )
    }
}
