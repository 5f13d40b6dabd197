use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

/// Error body Notion returns for every non-2xx response.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("Notion rejected the access token: {0}")]
    Unauthorized(String),
    #[error("Notion object not found: {0}")]
    NotFound(String),
    #[error("Notion rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
    #[error("Notion validation error: {0}")]
    Validation(String),
    #[error("Notion API error (HTTP {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("Failed to send Notion request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to decode Notion response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl NotionError {
    /// Classifies a failed response from its status, `Retry-After` header and body.
    pub fn from_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> Self {
        let parsed = serde_json::from_str::<NotionErrorBody>(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|b| b.code.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let message = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotionError::Unauthorized(message),
            StatusCode::NOT_FOUND => NotionError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => NotionError::RateLimited { retry_after },
            StatusCode::BAD_REQUEST if code == "validation_error" => {
                NotionError::Validation(message)
            }
            _ => NotionError::Api {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NotionError::RateLimited { .. })
    }

    /// Rate limits and transient server or network failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotionError::RateLimited { .. } => true,
            NotionError::Api { status, .. } => matches!(status, 409 | 500 | 502 | 503 | 504),
            NotionError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            NotionError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
