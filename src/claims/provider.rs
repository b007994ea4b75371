//! # Claims Provider
//!
//! The token verification capability and the storage claim extractor.

use serde::{Deserialize, Serialize};

use super::errors::{ClaimsError, ClaimsResult};

/// Audience every storage token must carry
pub const STORAGE_AUDIENCE: &str = "storage";

/// Claims carried by a storage token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageClaim {
    #[serde(rename = "UserID")]
    pub user_id: String,

    #[serde(rename = "DocumentID")]
    pub document_id: String,

    /// Audience (token purpose)
    #[serde(default)]
    pub aud: String,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,

    /// Issued at timestamp (Unix epoch seconds)
    #[serde(default)]
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies a token's integrity and expiry and returns its claims
///
/// Implementations must not enforce the audience; [`extract_storage_claim`]
/// does that.
pub trait ClaimsProvider: Send + Sync {
    fn decode(&self, token: &str) -> ClaimsResult<StorageClaim>;
}

/// Decode a token and require the storage audience
pub fn extract_storage_claim<P>(provider: &P, token: &str) -> ClaimsResult<StorageClaim>
where
    P: ClaimsProvider + ?Sized,
{
    let claim = provider.decode(token)?;
    if claim.aud != STORAGE_AUDIENCE {
        return Err(ClaimsError::WrongAudience(claim.aud));
    }
    Ok(claim)
}
