//! CLI module for blobgate
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the gateway
//! - sign-url: Print a signed blob URL
//! - issue-token: Print a storage claim token
//! - keygen: Print a fresh random secret

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{issue_token, keygen, run, run_command, serve, sign_url};
pub use errors::{CliError, CliErrorCode, CliResult};
