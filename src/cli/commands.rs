//! CLI command implementations
//!
//! `serve` is the only long-running command. The others load the same
//! configuration, print one value to stdout and exit.

use std::path::Path;

use chrono::Duration;
use serde_json::json;

use crate::claims::JwtClaimsProvider;
use crate::config::Config;
use crate::http_server::{AppState, HttpServer};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::signing::{generate_secret, SignedUrl, SignedUrlIssuer};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::SignUrl {
            config,
            uid,
            blob_id,
            ttl,
        } => sign_url(&config, &uid, &blob_id, ttl),
        Command::IssueToken {
            config,
            uid,
            document_id,
            ttl,
        } => issue_token(&config, &uid, &document_id, ttl),
        Command::Keygen => keygen(),
    }
}

/// Load configuration and serve until the listener fails
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.min_severity()?);

    let backend = format!("{:?}", config.backend).to_lowercase();
    let strict = config.strict_generation_header.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &config_path.display().to_string()),
            ("backend", &backend),
            ("data_dir", &config.data_dir),
            ("strict_generation_header", &strict),
        ],
    );

    let http_config = config.http.clone().with_port_override(port);

    let state = AppState::from_config(&config);
    let server = HttpServer::new(http_config, state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server.start().await.map_err(|e| {
            log_event_with_fields(Event::ServerFailed, &[("error", &e.to_string())]);
            CliError::boot_failed(format!("HTTP server failed: {}", e))
        })
    })
}

/// Print a signed blob URL as JSON
pub fn sign_url(config_path: &Path, uid: &str, blob_id: &str, ttl: Option<i64>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let signed = signed_url_for(&config, uid, blob_id, ttl)?;

    let output = serde_json::to_string(&signed)
        .map_err(|e| CliError::io_error(format!("JSON error: {}", e)))?;
    println!("{}", output);
    Ok(())
}

/// Print a storage claim token as JSON
pub fn issue_token(
    config_path: &Path,
    uid: &str,
    document_id: &str,
    ttl: Option<i64>,
) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let token = token_for(&config, uid, document_id, ttl)?;

    println!("{}", json!({ "token": token }));
    Ok(())
}

/// Print a fresh secret
pub fn keygen() -> CliResult<()> {
    println!("{}", generate_secret());
    Ok(())
}

fn ttl_or(ttl: Option<i64>, default: Duration) -> CliResult<Duration> {
    match ttl {
        Some(secs) if secs <= 0 => Err(CliError::config_error("--ttl must be > 0")),
        Some(secs) => Ok(Duration::seconds(secs)),
        None => Ok(default),
    }
}

fn signed_url_for(
    config: &Config,
    uid: &str,
    blob_id: &str,
    ttl: Option<i64>,
) -> CliResult<SignedUrl> {
    let issuer = SignedUrlIssuer::new(
        config.secret(),
        config.public_base_url()?,
        ttl_or(ttl, config.url_ttl())?,
    );
    Ok(issuer.issue(uid, blob_id)?)
}

fn token_for(config: &Config, uid: &str, document_id: &str, ttl: Option<i64>) -> CliResult<String> {
    let provider = JwtClaimsProvider::new(&config.secret());
    Ok(provider.issue(uid, document_id, ttl_or(ttl, config.token_ttl())?)?)
}
