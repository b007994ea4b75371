//! # Secret Key
//!
//! The process-wide shared secret used for HMAC URL signatures and for
//! storage claim tokens.

use std::fmt;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;

/// Immutable shared secret
///
/// Cloning is cheap; all clones point at the same bytes. The key is never
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Arc<[u8]>);

impl SecretKey {
    /// Wrap raw key bytes
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(bytes.as_ref()))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes>)", self.0.len())
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

/// Generate a cryptographically secure random secret
///
/// Returns a 256-bit (32-byte) random value as base64url.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}
