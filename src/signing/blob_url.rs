//! # Signed Blob URLs
//!
//! The query-parameter form of a signed blob request and the issuer that
//! produces such URLs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::{SigningError, SigningResult};
use super::keys::SecretKey;
use super::params::{sign, verify};

pub const PARAM_UID: &str = "uid";
pub const PARAM_BLOB_ID: &str = "blobid";
pub const PARAM_EXP: &str = "exp";
pub const PARAM_SIGNATURE: &str = "signature";

/// Route the issued URLs point at
pub const BLOB_ROUTE: &str = "/blobstorage";

/// Signed blob request as carried in the query string
///
/// Missing parameters deserialize as empty strings and fail verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SignedUrlRequest {
    #[serde(default)]
    pub uid: String,

    #[serde(default, rename = "blobid")]
    pub blob_id: String,

    #[serde(default)]
    pub exp: String,

    #[serde(default)]
    pub signature: String,
}

impl SignedUrlRequest {
    /// Signed fields, in signing order
    pub fn parts(&self) -> [&str; 3] {
        [&self.uid, &self.blob_id, &self.exp]
    }

    /// Verify signature and expiry against the current time
    pub fn verify(&self, key: &SecretKey) -> SigningResult<()> {
        verify(&self.parts(), &self.exp, &self.signature, key)
    }
}

/// An issued blob URL
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues signed blob URLs for a fixed public base URL
#[derive(Debug, Clone)]
pub struct SignedUrlIssuer {
    key: SecretKey,
    base_url: Url,
    ttl: Duration,
}

impl SignedUrlIssuer {
    /// Create a new issuer
    pub fn new(key: SecretKey, base_url: Url, ttl: Duration) -> Self {
        Self { key, base_url, ttl }
    }

    /// Issue a URL expiring `ttl` from now
    pub fn issue(&self, uid: &str, blob_id: &str) -> SigningResult<SignedUrl> {
        self.issue_at(uid, blob_id, Utc::now().timestamp())
    }

    /// Issue a URL expiring `ttl` after `now`
    pub fn issue_at(&self, uid: &str, blob_id: &str, now: i64) -> SigningResult<SignedUrl> {
        let expiry = now + self.ttl.num_seconds();
        let exp = expiry.to_string();
        let signature = sign(&[uid, blob_id, &exp], &self.key)?;

        let mut url = self.base_url.clone();
        let path = format!("{}{}", url.path().trim_end_matches('/'), BLOB_ROUTE);
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair(PARAM_UID, uid)
            .append_pair(PARAM_BLOB_ID, blob_id)
            .append_pair(PARAM_EXP, &exp)
            .append_pair(PARAM_SIGNATURE, &signature);

        let expires_at = Utc
            .timestamp_opt(expiry, 0)
            .single()
            .ok_or_else(|| SigningError::MalformedExpiry(exp.clone()))?;

        Ok(SignedUrl {
            url: url.into(),
            expires_at,
        })
    }
}
