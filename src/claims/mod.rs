//! # Storage Claims
//!
//! Claim tokens authorizing whole-document transfer.

pub mod errors;
pub mod jwt;
pub mod provider;

pub use errors::{ClaimsError, ClaimsResult};
pub use jwt::JwtClaimsProvider;
pub use provider::{extract_storage_claim, ClaimsProvider, StorageClaim, STORAGE_AUDIENCE};
