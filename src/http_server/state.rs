//! Shared handler state
//!
//! Built once at startup and shared read-only by every request task.

use std::io;
use std::sync::Arc;

use axum::body::Body;
use futures_util::TryStreamExt;

use crate::claims::{ClaimsProvider, JwtClaimsProvider};
use crate::config::{BackendKind, Config};
use crate::file_storage::{ByteStream, LocalBackend, MemoryBackend, StorageBackend};
use crate::signing::SecretKey;

/// State shared across the transfer handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn StorageBackend>,
    pub claims: Arc<dyn ClaimsProvider>,
    pub key: SecretKey,
    pub strict_generation_header: bool,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        claims: Arc<dyn ClaimsProvider>,
        key: SecretKey,
    ) -> Self {
        Self {
            backend,
            claims,
            key,
            strict_generation_header: false,
        }
    }

    /// Reject malformed generation headers instead of falling back to 0
    pub fn with_strict_generation_header(mut self, strict: bool) -> Self {
        self.strict_generation_header = strict;
        self
    }

    /// Build the state a configured server runs with
    pub fn from_config(config: &Config) -> Self {
        let key = config.secret();

        let backend: Arc<dyn StorageBackend> = match config.backend {
            BackendKind::Local => Arc::new(LocalBackend::new(config.data_path().to_path_buf())),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        };
        let claims: Arc<dyn ClaimsProvider> = Arc::new(JwtClaimsProvider::new(&key));

        Self::new(backend, claims, key)
            .with_strict_generation_header(config.strict_generation_header)
    }
}

/// Adapt a request body into a backend stream
pub fn body_stream(body: Body) -> ByteStream {
    Box::pin(body.into_data_stream().map_err(io::Error::other))
}
