//! API error taxonomy.
//!
//! DESIGN
//! ======
//! Every failure a remote call can produce is folded into [`ApiError`] at the
//! HTTP boundary, so callers match on meaning (bad credentials, expired
//! session, rejected payload) instead of raw status codes.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// How a request was authorized, which decides what a 401 means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAuth {
    /// No credential was attached.
    Anonymous,
    /// A bearer token was injected from the session.
    Bearer,
}

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The connection could not be established or broke mid-request.
    #[error("network request failed: {0}")]
    Network(String),

    /// The request did not complete before its deadline.
    #[error("request timed out")]
    Timeout,

    /// Credentials were rejected (bad login, forbidden resource).
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The bearer token attached to the request is no longer accepted.
    #[error("session expired: {message}")]
    SessionExpired { message: String },

    /// The server rejected the request payload.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The request conflicts with existing server state (e.g. duplicate email).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The addressed resource does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-success status.
    #[error("unexpected response status {status}")]
    Status { status: u16, body: String },

    /// A success response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Classify a transport-level failure.
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }

    /// Classify a non-success HTTP status.
    pub(crate) fn from_status(status: u16, body: String, auth: RequestAuth) -> Self {
        let message = detail_message(&body);
        match (status, auth) {
            (401, RequestAuth::Bearer) => Self::SessionExpired { message },
            (401 | 403, _) => Self::Authentication { message },
            (400 | 422, _) => Self::Validation { message },
            (409, _) => Self::Conflict { message },
            (404, _) => Self::NotFound { message },
            _ => Self::Status { status, body },
        }
    }

    /// Stable machine-readable code for display and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Timeout => "E_TIMEOUT",
            Self::Authentication { .. } => "E_AUTHENTICATION",
            Self::SessionExpired { .. } => "E_SESSION_EXPIRED",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Conflict { .. } => "E_CONFLICT",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. })
    }

    /// Whether the server refused the credential itself.
    #[must_use]
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::SessionExpired { .. } | Self::Authentication { .. })
    }
}

/// Human-readable message from an error body.
///
/// FastAPI-style bodies carry `{"detail": "..."}`; validation errors carry a
/// list of `{"msg": "..."}` entries under `detail`. Anything else is returned
/// trimmed as-is.
pub(crate) fn detail_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_owned();
    };
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
            if messages.is_empty() { body.trim().to_owned() } else { messages.join("; ") }
        }
        _ => body.trim().to_owned(),
    }
}
