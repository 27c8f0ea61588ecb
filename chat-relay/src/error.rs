//! Error types for waffle-relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use waffle_chat_types::WireError;

/// Main error type for waffle-relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Could not bind the listening socket.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Address we tried to bind.
        address: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body is not a valid message.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] WireError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
        };
        tracing::warn!("Rejected request: {}", self);
        (status, self.to_string()).into_response()
    }
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
