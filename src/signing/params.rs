//! # URL Parameter Signatures
//!
//! HMAC-SHA256 over an ordered list of string fields.
//!
//! ## Invariants
//! - Fields are concatenated in order with no delimiter; order is part of
//!   the contract.
//! - No field may be empty. An empty field would let two different field
//!   lists produce the same message.
//! - Signatures are compared in constant time.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::{SigningError, SigningResult};
use super::keys::SecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Sign an ordered list of fields
///
/// Returns the lower-case hex HMAC-SHA256 digest of the concatenated fields.
pub fn sign(parts: &[&str], key: &SecretKey) -> SigningResult<String> {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| SigningError::InvalidKey)?;

    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return Err(SigningError::EmptyField { index });
        }
        mac.update(part.as_bytes());
    }

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a signature and its expiry against the current time
pub fn verify(parts: &[&str], exp: &str, signature: &str, key: &SecretKey) -> SigningResult<()> {
    verify_at(parts, exp, signature, key, Utc::now().timestamp())
}

/// Verify a signature and its expiry against an explicit clock value
///
/// Check order: empty fields, expiry format, expiry time, signature.
pub fn verify_at(
    parts: &[&str],
    exp: &str,
    signature: &str,
    key: &SecretKey,
    now: i64,
) -> SigningResult<()> {
    let expected = sign(parts, key)?;

    let expiry: i64 = exp
        .parse()
        .map_err(|_| SigningError::MalformedExpiry(exp.to_string()))?;

    if expiry < now {
        return Err(SigningError::Expired { expiry, now });
    }

    if !constant_time_str_eq(&expected, signature) {
        return Err(SigningError::SignatureMismatch);
    }

    Ok(())
}

/// Constant-time comparison of two strings
///
/// Length is not treated as secret; content is.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAR_FUTURE: &str = "1999999999";

    fn key() -> SecretKey {
        SecretKey::from("test-secret")
    }

    #[test]
    fn test_sign_is_lowercase_hex() {
        let sig = sign(&["u1", "b1", FAR_FUTURE], &key()).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_sign_matches_plain_hmac_of_concatenation() {
        let sig = sign(&["u1", "b1", FAR_FUTURE], &key()).unwrap();

        let mut mac = HmacSha256::new_from_slice(b"test-secret").unwrap();
        mac.update(b"u1b11999999999");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sig, expected);
    }

    #[test]
    fn test_sign_rejects_empty_field_in_every_position() {
        let fields = ["uid", "blob", FAR_FUTURE];
        for index in 0..fields.len() {
            let mut parts = fields;
            parts[index] = "";
            assert_eq!(
                sign(&parts, &key()),
                Err(SigningError::EmptyField { index })
            );
        }
    }

    #[test]
    fn test_verify_round_trip() {
        let parts = ["u1", "b1", FAR_FUTURE];
        let sig = sign(&parts, &key()).unwrap();
        assert!(verify_at(&parts, FAR_FUTURE, &sig, &key(), 1_700_000_000).is_ok());
    }

    #[test]
    fn test_far_future_expiry_lapses() {
        let parts = ["u1", "b1", FAR_FUTURE];
        let sig = sign(&parts, &key()).unwrap();

        assert!(verify_at(&parts, FAR_FUTURE, &sig, &key(), 1_999_999_999).is_ok());
        assert_eq!(
            verify_at(&parts, FAR_FUTURE, &sig, &key(), 2_000_000_000),
            Err(SigningError::Expired {
                expiry: 1_999_999_999,
                now: 2_000_000_000
            })
        );
    }

    #[test]
    fn test_any_key_length_signs() {
        let long = "k".repeat(200);
        for key in [SecretKey::new(b""), SecretKey::from("k"), SecretKey::from(long.as_str())] {
            let sig = sign(&["u1", "b1", FAR_FUTURE], &key).unwrap();
            assert!(verify_at(&["u1", "b1", FAR_FUTURE], FAR_FUTURE, &sig, &key, 0).is_ok());
        }
    }

    #[test]
    fn test_verify_expiry_boundary() {
        let parts = ["u1", "b1", "1000"];
        let sig = sign(&parts, &key()).unwrap();

        // exp == now is still valid
        assert!(verify_at(&parts, "1000", &sig, &key(), 1000).is_ok());
        assert_eq!(
            verify_at(&parts, "1000", &sig, &key(), 1001),
            Err(SigningError::Expired {
                expiry: 1000,
                now: 1001
            })
        );
    }

    #[test]
    fn test_verify_malformed_expiry() {
        let parts = ["u1", "b1", "soon"];
        let sig = sign(&parts, &key()).unwrap();
        assert!(matches!(
            verify_at(&parts, "soon", &sig, &key(), 0),
            Err(SigningError::MalformedExpiry(_))
        ));
    }

    #[test]
    fn test_verify_wrong_key() {
        let parts = ["u1", "b1", FAR_FUTURE];
        let sig = sign(&parts, &key()).unwrap();
        let other = SecretKey::from("other-secret");
        assert_eq!(
            verify_at(&parts, FAR_FUTURE, &sig, &other, 0),
            Err(SigningError::SignatureMismatch)
        );
    }

    #[test]
    fn test_field_order_matters() {
        let sig = sign(&["a", "b", FAR_FUTURE], &key()).unwrap();
        assert_eq!(
            verify_at(&["b", "a", FAR_FUTURE], FAR_FUTURE, &sig, &key(), 0),
            Err(SigningError::SignatureMismatch)
        );
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let parts = ["u1", "b1", FAR_FUTURE];
        let sig = sign(&parts, &key()).unwrap().to_uppercase();
        assert_eq!(
            verify_at(&parts, FAR_FUTURE, &sig, &key(), 0),
            Err(SigningError::SignatureMismatch)
        );
    }

    #[test]
    fn test_constant_time_comparison() {
        assert!(constant_time_str_eq("hello", "hello"));
        assert!(!constant_time_str_eq("hello", "world"));
        assert!(!constant_time_str_eq("hello", "hello!"));
    }
}
