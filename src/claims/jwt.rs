//! # JWT Storage Tokens
//!
//! HS256 JSON Web Tokens carrying a [`StorageClaim`].
//!
//! ## Invariants
//! - Stateless validation (no lookup)
//! - Signature and expiry are checked here, audience is not

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::errors::{ClaimsError, ClaimsResult};
use super::provider::{ClaimsProvider, StorageClaim, STORAGE_AUDIENCE};
use crate::signing::SecretKey;

/// JWT-backed claims provider and issuer
#[derive(Clone)]
pub struct JwtClaimsProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtClaimsProvider {
    /// Create a provider keyed by the shared secret
    pub fn new(key: &SecretKey) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
        }
    }

    /// Issue a storage token valid for `ttl`
    pub fn issue(&self, user_id: &str, document_id: &str, ttl: Duration) -> ClaimsResult<String> {
        self.issue_at(user_id, document_id, ttl, Utc::now().timestamp())
    }

    /// Issue a storage token valid for `ttl` after `now`
    pub fn issue_at(
        &self,
        user_id: &str,
        document_id: &str,
        ttl: Duration,
        now: i64,
    ) -> ClaimsResult<String> {
        let claims = StorageClaim {
            user_id: user_id.to_string(),
            document_id: document_id.to_string(),
            aud: STORAGE_AUDIENCE.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
            iss: None,
        };
        self.encode_claims(&claims)
    }

    /// Encode arbitrary claims
    pub fn encode_claims(&self, claims: &StorageClaim) -> ClaimsResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| ClaimsError::TokenGenerationFailed)
    }
}

impl ClaimsProvider for JwtClaimsProvider {
    fn decode(&self, token: &str) -> ClaimsResult<StorageClaim> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<StorageClaim>(token, &self.decoding_key, &validation)
            .map_err(|e| ClaimsError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}
