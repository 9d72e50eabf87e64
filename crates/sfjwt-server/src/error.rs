//! Error types for the server.
//!
//! Every error renders as `{error, error_description}`. Provider errors are
//! not represented here: they are relayed with the provider's own status and
//! body.

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sfjwt_oauth::OAuthError;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Input validation or a local signing/transport failure.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// No live session with this id.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Path segment is not a session id.
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<sfjwt_session::Error> for ServerError {
    fn from(e: sfjwt_session::Error) -> Self {
        ServerError::SessionNotFound(e.session_id().to_string())
    }
}

impl From<BytesRejection> for ServerError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            ServerError::Internal(rejection.body_text())
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable tag.
    pub error: String,
    pub error_description: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::OAuth(e) if e.is_local_failure() => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::OAuth(_) => StatusCode::BAD_REQUEST,
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::OAuth(e) => e.code(),
            ServerError::SessionNotFound(_) => "session_not_found",
            ServerError::InvalidSessionId(_) => "invalid_session_id",
            ServerError::PayloadTooLarge => "payload_too_large",
            ServerError::RateLimitExceeded { .. } => "rate_limit_exceeded",
            ServerError::Internal(_) | ServerError::Config(_) => "internal_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let description = match &self {
            ServerError::OAuth(e) => e.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, code, error = %description, "Server error");
        } else {
            tracing::warn!(status = %status, code, error = %description, "Client error");
        }

        let body = Json(ErrorResponse {
            error: code.to_string(),
            error_description: description,
        });

        match self {
            ServerError::RateLimitExceeded { retry_after_secs } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
