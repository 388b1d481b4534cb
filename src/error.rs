use reqwest::StatusCode;
use serde_json::Value;

/// Substring the backend puts in `detail` when a new window overlaps an
/// existing assignment for the same employee.
pub const CONFLICT_MARKER: &str = "conflicting";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Backend returned {status}: {detail}")]
    Api { status: StatusCode, detail: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Classify a non-success backend response. The conflict marker wins over
    /// the status code since the backend reports double-booking as a plain 400.
    pub fn from_api_failure(status: StatusCode, detail: String) -> Self {
        if detail.contains(CONFLICT_MARKER) {
            return AppError::Conflict(detail);
        }

        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(detail),
            StatusCode::NOT_FOUND => AppError::NotFound(detail),
            _ => AppError::Api { status, detail },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}`,
/// `{"error": "..."}` and falls back to the raw text.
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    match value.get("detail").or_else(|| value.get("error")) {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

pub type AppResult<T> = Result<T, AppError>;
