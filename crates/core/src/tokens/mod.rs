//! Token Authority
//!
//! Two unrelated token families share one HMAC-SHA256 primitive:
//!
//! * [`admin`]: self-contained, stateless admin session tokens. Revocation is
//!   by rotating the signing secret.
//! * [`sso`]: random one-time exchange tokens, persisted by the caller and
//!   redeemed by a linked external system.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

pub mod admin;
pub mod cookie;
pub mod sso;

pub use admin::*;
pub use cookie::*;
pub use sso::*;

type HmacSha256 = Hmac<Sha256>;

/// Server-held HMAC-SHA256 key.
#[derive(Clone)]
pub struct SigningKey {
    mac: HmacSha256,
}

/// Signing key construction errors.
#[derive(Debug, Error)]
pub enum SigningKeyError {
    /// No secret bytes were configured.
    #[error("signing secret is empty")]
    Empty,

    /// The MAC rejected the key length.
    #[error("signing secret has an invalid length")]
    InvalidLength,
}

impl SigningKey {
    /// Build a key from secret bytes. The caller's copy is wiped.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let mut secret = secret.into();

        if secret.is_empty() {
            return Err(SigningKeyError::Empty);
        }

        let mac = HmacSha256::new_from_slice(&secret)
            .map_err(|_invalid| SigningKeyError::InvalidLength);

        secret.zeroize();

        Ok(Self { mac: mac? })
    }

    /// HMAC-SHA256 of `message`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.mac
            .clone()
            .chain_update(message)
            .finalize()
            .into_bytes()
            .to_vec()
    }

    /// HMAC-SHA256 of `message`, lowercase hex.
    #[must_use]
    pub fn sign_hex(&self, message: &[u8]) -> String {
        hex::encode(self.sign(message))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(**redacted**)")
    }
}

/// Compare two byte strings without leaking where they differ.
///
/// Different lengths return `false` before any byte is compared.
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.ct_eq(right).into()
}
