//! Convenience result type alias for ClassHub.

use crate::error::AppError;

/// A specialized `Result` type for ClassHub operations.
pub type AppResult<T> = Result<T, AppError>;
