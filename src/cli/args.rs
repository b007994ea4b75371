//! CLI argument definitions using clap
//!
//! Commands:
//! - blobgate serve --config <path> [--port <port>]
//! - blobgate sign-url --config <path> --uid <uid> --blob-id <id> [--ttl <secs>]
//! - blobgate issue-token --config <path> --uid <uid> --document-id <id> [--ttl <secs>]
//! - blobgate keygen

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blobgate - Authenticated document and blob transfer gateway
#[derive(Parser, Debug)]
#[command(name = "blobgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./blobgate.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a signed blob URL
    SignUrl {
        /// Path to configuration file
        #[arg(long, default_value = "./blobgate.json")]
        config: PathBuf,

        #[arg(long)]
        uid: String,

        #[arg(long)]
        blob_id: String,

        /// Lifetime in seconds (defaults to url_ttl_secs)
        #[arg(long)]
        ttl: Option<i64>,
    },

    /// Print a storage claim token
    IssueToken {
        /// Path to configuration file
        #[arg(long, default_value = "./blobgate.json")]
        config: PathBuf,

        #[arg(long)]
        uid: String,

        #[arg(long)]
        document_id: String,

        /// Lifetime in seconds (defaults to token_ttl_secs)
        #[arg(long)]
        ttl: Option<i64>,
    },

    /// Print a random secret suitable for secret_key
    Keygen,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["blobgate", "serve", "--config", "c.json", "--port", "8081"])
            .unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("c.json"));
                assert_eq!(port, Some(8081));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_sign_url() {
        let cli = Cli::try_parse_from([
            "blobgate", "sign-url", "--uid", "u1", "--blob-id", "b1", "--ttl", "60",
        ])
        .unwrap();
        match cli.command {
            Command::SignUrl {
                config,
                uid,
                blob_id,
                ttl,
            } => {
                assert_eq!(config, PathBuf::from("./blobgate.json"));
                assert_eq!(uid, "u1");
                assert_eq!(blob_id, "b1");
                assert_eq!(ttl, Some(60));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_issue_token_requires_document_id() {
        assert!(Cli::try_parse_from(["blobgate", "issue-token", "--uid", "u1"]).is_err());
    }
}
