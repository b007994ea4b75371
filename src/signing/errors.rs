//! # Signing Errors
//!
//! Error types for signed URL parameters.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Signed URL errors
///
/// Every variant except `InvalidKey` is an authentication failure. None of
/// them should reveal which part of the signed message was wrong beyond what
/// the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// A signed field was empty
    #[error("Signed field at index {index} is empty")]
    EmptyField { index: usize },

    /// Expiry is not a decimal integer
    #[error("Malformed expiry: {0}")]
    MalformedExpiry(String),

    /// Expiry lies in the past
    #[error("Signature expired at {expiry} (now {now})")]
    Expired { expiry: i64, now: i64 },

    /// Signature does not match the signed fields
    #[error("Invalid signature")]
    SignatureMismatch,

    /// The MAC rejected the configured key
    #[error("Signing key rejected")]
    InvalidKey,
}

impl SigningError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            SigningError::EmptyField { .. } => 403,
            SigningError::MalformedExpiry(_) => 403,
            SigningError::Expired { .. } => 403,
            SigningError::SignatureMismatch => 403,
            SigningError::InvalidKey => 500,
        }
    }
}
