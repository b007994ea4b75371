//! Gateway configuration
//!
//! Loaded from a JSON file. `BLOBGATE_SECRET_KEY`, when set, replaces the
//! file's `secret_key`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::signing::SecretKey;

/// Environment variable overriding `secret_key`
pub const SECRET_KEY_ENV: &str = "BLOBGATE_SECRET_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which storage backend serves requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Memory,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared secret for URL signatures and claim tokens (required)
    #[serde(default)]
    pub secret_key: String,

    /// Root directory of the local backend
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Public base URL used when issuing signed blob URLs
    #[serde(default = "default_public_url")]
    pub public_url: String,

    #[serde(default = "default_ttl_secs")]
    pub url_ttl_secs: i64,

    #[serde(default = "default_ttl_secs")]
    pub token_ttl_secs: i64,

    /// Reject malformed `x-goog-if-generation-match` headers with 400
    /// instead of treating them as generation 0
    #[serde(default)]
    pub strict_generation_header: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "./blobgate-data".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_ttl_secs() -> i64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::from_json(&content)?;
        config.apply_secret_override(std::env::var(SECRET_KEY_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parse without validating
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Replace the secret when an override is present and non-empty
    pub fn apply_secret_override(&mut self, secret: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.secret_key = secret;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "secret_key is required (or set {})",
                SECRET_KEY_ENV
            )));
        }

        if self.backend == BackendKind::Local && self.data_dir.is_empty() {
            return Err(ConfigError::Invalid(
                "data_dir is required for the local backend".into(),
            ));
        }

        if self.url_ttl_secs <= 0 {
            return Err(ConfigError::Invalid("url_ttl_secs must be > 0".into()));
        }

        if self.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid("token_ttl_secs must be > 0".into()));
        }

        self.public_base_url()?;
        self.min_severity()?;

        Ok(())
    }

    pub fn secret(&self) -> SecretKey {
        SecretKey::from(self.secret_key.as_str())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn public_base_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.public_url).map_err(|e| {
            ConfigError::Invalid(format!("public_url '{}': {}", self.public_url, e))
        })
    }

    pub fn url_ttl(&self) -> Duration {
        Duration::seconds(self.url_ttl_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::seconds(self.token_ttl_secs)
    }

    pub fn min_severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level)))
    }
}
