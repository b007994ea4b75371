//! # Signed URL Parameters
//!
//! HMAC-SHA256 signatures over ordered string fields, expiry validation,
//! and issuance of signed blob URLs.

pub mod errors;
pub mod keys;
pub mod params;
pub mod blob_url;

pub use errors::{SigningError, SigningResult};
pub use keys::{generate_secret, SecretKey};
pub use params::{sign, verify, verify_at};
pub use blob_url::{SignedUrl, SignedUrlIssuer, SignedUrlRequest};
