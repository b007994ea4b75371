//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::claims::ClaimsError;
use crate::config::ConfigError;
use crate::signing::SigningError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error
    IoError,
    /// URL or token could not be produced
    IssueFailed,
    /// Runtime or listener failed
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "BLOBGATE_CLI_CONFIG_ERROR",
            Self::IoError => "BLOBGATE_CLI_IO_ERROR",
            Self::IssueFailed => "BLOBGATE_CLI_ISSUE_FAILED",
            Self::BootFailed => "BLOBGATE_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn issue_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IssueFailed, msg)
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<SigningError> for CliError {
    fn from(e: SigningError) -> Self {
        Self::issue_failed(e.to_string())
    }
}

impl From<ClaimsError> for CliError {
    fn from(e: ClaimsError) -> Self {
        Self::issue_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::from(ConfigError::Invalid("secret_key is required".into()));
        assert_eq!(err.code_str(), CliErrorCode::ConfigError.code());
        assert!(err.to_string().starts_with("BLOBGATE_CLI_CONFIG_ERROR: "));
    }
}
