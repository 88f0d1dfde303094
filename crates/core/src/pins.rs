//! Staff PIN hashing and verification.
//!
//! Stored format: `scrypt$<salt-hex>$<derived-key-hex>`. The hex salt string
//! itself is the scrypt salt input. Accounts created before hashing carry a
//! plaintext PIN, which is only consulted when no scrypt hash is stored.

use rand::{RngCore, rngs::OsRng};
use scrypt::{Params, scrypt};
use thiserror::Error;
use zeroize::Zeroize;

use crate::tokens::constant_time_eq;

/// Prefix identifying a scrypt PIN hash.
pub const PIN_HASH_SCHEME: &str = "scrypt";

/// Random salt bytes per hash.
pub const PIN_SALT_BYTES: usize = 16;

/// Derived key length in bytes.
pub const PIN_KEY_BYTES: usize = 64;

/// Digits in a staff PIN.
pub const PIN_LENGTH: usize = 4;

const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// PIN hashing errors.
#[derive(Debug, Error)]
pub enum PinError {
    /// The PIN is not exactly four digits.
    #[error("PIN must be exactly 4 digits")]
    InvalidFormat,

    /// Key derivation failed.
    #[error("failed to derive PIN key")]
    Derivation,
}

/// Exactly four ASCII digits.
pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit())
}

/// Hash a staff PIN with a fresh random salt.
///
/// # Errors
///
/// Returns [`PinError::InvalidFormat`] for anything other than four digits.
pub fn hash_pin(pin: &str) -> Result<String, PinError> {
    if !is_valid_pin(pin) {
        return Err(PinError::InvalidFormat);
    }

    let mut salt = [0_u8; PIN_SALT_BYTES];

    OsRng.fill_bytes(&mut salt);

    let salt_hex = hex::encode(salt);
    let mut key = derive_key(pin, &salt_hex)?;

    let hash = format!("{PIN_HASH_SCHEME}${salt_hex}${}", hex::encode(&key));

    key.zeroize();

    Ok(hash)
}

/// Check `pin` against the stored hash, falling back to a legacy plaintext
/// PIN when the stored hash is absent or not a scrypt hash.
///
/// A malformed scrypt hash or a derivation failure verifies as `false`.
pub fn verify_pin(pin: &str, stored_hash: Option<&str>, legacy_pin: Option<&str>) -> bool {
    if let Some(hash) = stored_hash
        && is_scrypt_hash(hash)
    {
        return verify_hash(pin, hash);
    }

    legacy_pin
        .filter(|legacy| !legacy.is_empty())
        .is_some_and(|legacy| legacy == pin)
}

fn is_scrypt_hash(hash: &str) -> bool {
    hash.strip_prefix(PIN_HASH_SCHEME)
        .is_some_and(|rest| rest.starts_with('$'))
}

fn verify_hash(pin: &str, hash: &str) -> bool {
    let mut parts = hash.splitn(3, '$');

    let (Some(PIN_HASH_SCHEME), Some(salt), Some(key_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if salt.is_empty() {
        return false;
    }

    let Ok(expected) = hex::decode(key_hex) else {
        return false;
    };

    if expected.len() != PIN_KEY_BYTES {
        return false;
    }

    let Ok(mut derived) = derive_key(pin, salt) else {
        return false;
    };

    let verified = constant_time_eq(&derived, &expected);

    derived.zeroize();

    verified
}

fn derive_key(pin: &str, salt: &str) -> Result<Vec<u8>, PinError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, PIN_KEY_BYTES)
        .map_err(|_invalid| PinError::Derivation)?;

    let mut key = vec![0_u8; PIN_KEY_BYTES];

    scrypt(pin.as_bytes(), salt.as_bytes(), &params, &mut key)
        .map_err(|_invalid| PinError::Derivation)?;

    Ok(key)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn pin_format() {
        assert!(is_valid_pin("0000"));
        assert!(is_valid_pin("1234"));

        for pin in ["", "123", "12345", "12a4", " 123", "١٢٣٤"] {
            assert!(!is_valid_pin(pin), "{pin:?}");
        }
    }

    #[test]
    fn hashed_pin_verifies_only_against_itself() -> TestResult {
        let hash = hash_pin("4821")?;

        assert!(verify_pin("4821", Some(&hash), None));

        for other in ["4820", "0000", "1284"] {
            assert!(!verify_pin(other, Some(&hash), None), "{other}");
        }

        Ok(())
    }

    #[test]
    fn hash_has_expected_shape() -> TestResult {
        let hash = hash_pin("0042")?;
        let parts = hash.split('$').collect::<Vec<_>>();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first(), Some(&PIN_HASH_SCHEME));
        assert_eq!(parts.get(1).map(|salt| salt.len()), Some(PIN_SALT_BYTES * 2));
        assert_eq!(parts.get(2).map(|key| key.len()), Some(PIN_KEY_BYTES * 2));

        Ok(())
    }

    #[test]
    fn invalid_pins_are_not_hashed() {
        assert!(matches!(hash_pin("12345"), Err(PinError::InvalidFormat)));
    }

    #[test]
    fn legacy_plain_pin_is_exact_match() {
        assert!(verify_pin("1234", None, Some("1234")));
        assert!(!verify_pin("1235", None, Some("1234")));
        assert!(!verify_pin("", None, Some("")));
    }

    #[test]
    fn stored_hash_shadows_legacy_pin() -> TestResult {
        let hash = hash_pin("9999")?;

        assert!(!verify_pin("1234", Some(&hash), Some("1234")));

        Ok(())
    }

    #[test]
    fn malformed_scrypt_hashes_fail_closed() {
        for hash in [
            "scrypt$",
            "scrypt$salt",
            "scrypt$$00",
            "scrypt$salt$not-hex",
            "scrypt$salt$00ff",
        ] {
            assert!(!verify_pin("1234", Some(hash), Some("1234")), "{hash}");
        }
    }

    #[test]
    fn unrecognized_hash_falls_back_to_legacy_pin() {
        for hash in ["bcrypt$abc$def", "sha1$deadbeef", "scryptish$a$b", ""] {
            assert!(verify_pin("1234", Some(hash), Some("1234")), "{hash}");
            assert!(!verify_pin("1235", Some(hash), Some("1234")), "{hash}");
            assert!(!verify_pin("1234", Some(hash), None), "{hash}");
        }
    }

    #[test]
    fn nothing_stored_never_verifies() {
        assert!(!verify_pin("1234", None, None));
    }
}
