//! # File Storage Errors

use thiserror::Error;

use super::backend::Generation;

/// Result type for storage operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Compare-and-swap lost; nothing was written
    #[error("Generation mismatch: expected {expected}, current {current}")]
    GenerationMismatch {
        expected: Generation,
        current: Generation,
    },

    #[error("Invalid key component: {0:?}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            BackendError::NotFound(_) => 404,
            BackendError::GenerationMismatch { .. } => 412,
            BackendError::InvalidKey(_) => 500,
            BackendError::Io(_) => 500,
            BackendError::Internal(_) => 500,
        }
    }
}
