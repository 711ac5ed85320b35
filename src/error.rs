// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with user-presentable messages.

/// Error type for API and session operations.
///
/// `Display` output is the message callers show to the user, so the wording
/// here follows the service's established copy (for example the connectivity
/// message for any transport failure).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure before an HTTP status existed.
    #[error("Please check your internet connection")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx HTTP status. `message` is the server envelope's message when
    /// one could be parsed, otherwise a fixed fallback for the status code.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope was missing the expected `data` payload,
    /// or a body that did not decode at all.
    #[error("Invalid response format")]
    MalformedResponse,

    /// A refresh was requested but no refresh token is stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Local persistence failure (session file read/write).
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Fallback message for a non-2xx status whose body carried no usable
    /// envelope message.
    pub fn http_fallback(status: u16) -> Self {
        let message = match status {
            400 => "Bad request",
            401 => "Unauthorized access",
            403 => "Access forbidden",
            404 => "Resource not found",
            500 => "Server error",
            _ => "An error occurred",
        };
        ApiError::Http {
            status,
            message: message.to_string(),
        }
    }

    /// True for 401/403 statuses, the ones the request gate treats as a
    /// session invalidation.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
