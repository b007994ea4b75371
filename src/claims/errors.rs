//! # Claims Errors

use thiserror::Error;

/// Result type for claims operations
pub type ClaimsResult<T> = Result<T, ClaimsError>;

/// Claim token errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// Token is malformed, forged or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token was issued for another purpose
    #[error("Not a storage token (audience: {0:?})")]
    WrongAudience(String),

    /// Token could not be encoded
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl ClaimsError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ClaimsError::InvalidToken(_) => 400,
            ClaimsError::WrongAudience(_) => 400,
            ClaimsError::TokenGenerationFailed => 500,
        }
    }
}
