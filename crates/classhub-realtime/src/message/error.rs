//! Scoped error replies.
//!
//! Errors go to the initiating connection only and never close it.
//! Upstream failures are logged here and reach the client as a generic
//! `server_error`.

use serde::{Deserialize, Serialize};
use tracing::error;

use classhub_core::error::{AppError, ErrorKind};

/// Error codes understood by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Forbidden,
    ValidationError,
    NotJoined,
    ServerError,
}

/// An error to report on the initiating connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventError {
    pub code: ErrorCode,
    pub message: String,
}

impl EventError {
    /// The connection has not joined the conversation it addressed.
    pub fn not_joined() -> Self {
        Self {
            code: ErrorCode::NotJoined,
            message: "Join the conversation first".to_string(),
        }
    }

    /// A malformed or oversized frame.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: message.into(),
        }
    }
}

impl From<AppError> for EventError {
    fn from(err: AppError) -> Self {
        let code = match err.kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Forbidden | ErrorKind::Unauthorized => ErrorCode::Forbidden,
            ErrorKind::Validation => ErrorCode::ValidationError,
            ErrorKind::Conflict => ErrorCode::ServerError,
            kind if kind.is_upstream() => {
                error!(error = %err, source = ?err.source, "Event failed upstream");
                return Self {
                    code: ErrorCode::ServerError,
                    message: "Internal server error".to_string(),
                };
            }
            _ => ErrorCode::ServerError,
        };
        Self {
            code,
            message: err.message,
        }
    }
}
