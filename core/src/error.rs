//! Error types for the Cureat API client core.
//!
//! # Design
//! `ApiError` is what the transport, `HttpJsonClient` and `AuthSession` hand
//! back to callers. Transport failures, non-2xx statuses and malformed bodies
//! each get their own variant so the UI can tell "server unreachable" from
//! "server said no". The gateway errors are deliberately lossy: they carry a
//! user-facing message only, and the underlying `ApiError` is logged where it
//! is discarded.

use thiserror::Error;

/// Errors returned by the transport, the JSON client and the auth session.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken body).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status outside 2xx.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    HttpStatus { status: u16, detail: Option<String> },

    /// The response body is not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx token response carried neither `access_token` nor `token`.
    #[error("token missing from login response")]
    Credential,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status code, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the local key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("storage contents are corrupt: {0}")]
    Format(String),
}

/// Failure of a recommendation search or search-log call.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SearchError {
    pub message: String,
}

impl SearchError {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Failure of a date-course creation call.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CourseCreationError {
    pub message: String,
}

impl CourseCreationError {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_includes_detail() {
        let err = ApiError::HttpStatus {
            status: 401,
            detail: Some("bad credentials".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 401: bad credentials");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn http_status_display_without_detail() {
        let err = ApiError::HttpStatus {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "HTTP 502: no detail");
    }

    #[test]
    fn storage_error_converts_into_api_error() {
        let err: ApiError = StorageError::Format("not an object".to_string()).into();
        assert!(matches!(err, ApiError::Storage(StorageError::Format(_))));
        assert_eq!(err.status(), None);
    }
}
