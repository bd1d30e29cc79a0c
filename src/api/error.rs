//! Errors returned by the registration backend client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 from the backend. The stored token has already been cleared.
    #[error("Authentication failed. Please login again.")]
    AuthenticationFailed,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status; `message` comes from the response body when it has one.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Admin call attempted without a token; no request was sent.
    #[error("Not authenticated. Please login first.")]
    NotAuthenticated,

    #[error("Invalid login response - no token received")]
    MissingToken,

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Classify a non-2xx, non-401 status.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::FORBIDDEN => ApiError::AccessDenied(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Http {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Message the backend put in its error body, if this error came from one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::AccessDenied(m) | ApiError::NotFound(m) => Some(m),
            ApiError::Server { message, .. } | ApiError::Http { message, .. } => Some(message),
            _ => None,
        }
    }

    /// True for failures where the request may never have reached the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Network(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}
