//! One-time SSO exchange tokens.
//!
//! A linked external system proves itself with a shared secret and receives a
//! short-lived random token bound to one tenant. Persisting the token and
//! enforcing single use belong to the caller and the consumer.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

use crate::tokens::constant_time_eq;

/// Exchange token lifetime.
pub const SSO_TOKEN_TTL: SignedDuration = SignedDuration::from_secs(60);

/// Random bytes per exchange token.
pub const SSO_TOKEN_BYTES: usize = 32;

/// Outcome of comparing a presented secret with the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretComparison {
    /// Byte lengths differ; no byte was compared.
    LengthMismatch,

    /// Same length, different content.
    Mismatch,

    /// Identical.
    Match,
}

/// Server-configured shared secret for SSO callers.
#[derive(Clone)]
pub struct SsoSecret {
    bytes: Vec<u8>,
}

impl SsoSecret {
    /// Wrap the configured secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: secret.into(),
        }
    }

    /// Whether a secret is configured at all.
    pub fn is_configured(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// Compare `provided` against the configured secret.
    pub fn compare(&self, provided: &[u8]) -> SecretComparison {
        if provided.len() != self.bytes.len() {
            return SecretComparison::LengthMismatch;
        }

        if constant_time_eq(&self.bytes, provided) {
            SecretComparison::Match
        } else {
            SecretComparison::Mismatch
        }
    }

    /// Whether `provided` equals the configured secret. An unconfigured
    /// secret never matches.
    pub fn matches(&self, provided: &str) -> bool {
        self.is_configured() && self.compare(provided.as_bytes()) == SecretComparison::Match
    }
}

impl fmt::Debug for SsoSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SsoSecret(**redacted**)")
    }
}

impl Drop for SsoSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// 32 random bytes from the OS, lowercase hex.
#[must_use]
pub fn generate_sso_token() -> String {
    let mut bytes = [0_u8; SSO_TOKEN_BYTES];

    OsRng.fill_bytes(&mut bytes);

    let token = hex::encode(bytes);

    bytes.zeroize();

    token
}

/// A freshly generated exchange token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoGrant {
    /// Hex token handed to the external system.
    pub token: String,

    /// Instant after which the consumer must refuse the token.
    pub expires_at: Timestamp,
}

impl SsoGrant {
    /// Generate a token valid for `ttl` from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error when the expiry overflows the timestamp range.
    pub fn issue(now: Timestamp, ttl: SignedDuration) -> Result<Self, jiff::Error> {
        Ok(Self {
            token: generate_sso_token(),
            expires_at: now.checked_add(ttl)?,
        })
    }
}
