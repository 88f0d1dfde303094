//! Admin session tokens.
//!
//! Wire format: `base64url(json claims).base64url(hmac)`, no padding. Tokens
//! are never stored server-side; an admin stays signed in until the token
//! expires or the cookie is cleared.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokens::{SigningKey, constant_time_eq};

/// Admin session lifetime.
pub const ADMIN_SESSION_TTL: SignedDuration = SignedDuration::from_hours(8);

/// Domain accepted for admins when no explicit allowlist is configured.
pub const DEFAULT_ADMIN_DOMAIN: &str = "lealtad.app";

/// Lowercase and trim an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Operators allowed to hold an admin session.
#[derive(Debug, Clone)]
pub struct AdminAllowlist {
    emails: Vec<String>,
    default_domain: String,
}

impl AdminAllowlist {
    /// Explicit allowlist; an empty list falls back to the default domain.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| normalize_email(email.as_ref()))
                .filter(|email| !email.is_empty())
                .collect(),
            default_domain: DEFAULT_ADMIN_DOMAIN.to_string(),
        }
    }

    /// Parse a comma-separated list such as `ADMIN_EMAILS`.
    pub fn from_csv(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Override the fallback domain.
    #[must_use]
    pub fn with_default_domain(mut self, domain: &str) -> Self {
        self.default_domain = normalize_email(domain).trim_start_matches('@').to_string();
        self
    }

    /// Whether an explicit list is configured.
    pub fn is_explicit(&self) -> bool {
        !self.emails.is_empty()
    }

    /// Whether `email` may hold an admin session.
    pub fn permits(&self, email: &str) -> bool {
        let email = normalize_email(email);

        if email.is_empty() {
            return false;
        }

        if self.is_explicit() {
            return self.emails.contains(&email);
        }

        email
            .rsplit_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain == self.default_domain)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminSessionClaims {
    email: String,
    iat: i64,
    exp: i64,
}

/// A verified admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// Normalized admin email.
    pub email: String,

    /// When the token was issued.
    pub issued_at: Timestamp,

    /// When the token stops verifying.
    pub expires_at: Timestamp,
}

/// A freshly signed admin token.
#[derive(Debug, Clone)]
pub struct IssuedAdminToken {
    /// Value for the session cookie.
    pub token: String,

    /// Claims carried by the token.
    pub session: AdminSession,
}

/// Admin token issuance errors.
#[derive(Debug, Error)]
pub enum AdminTokenError {
    /// The email is not on the admin allowlist.
    #[error("not authorized")]
    NotAllowed,

    /// The expiry could not be represented.
    #[error("invalid token lifetime")]
    Lifetime(#[source] jiff::Error),

    /// The claims could not be serialized.
    #[error("failed to encode token")]
    Encoding(#[source] serde_json::Error),
}

/// Signs and verifies admin session tokens.
#[derive(Debug, Clone)]
pub struct AdminTokenAuthority {
    key: SigningKey,
    allowlist: AdminAllowlist,
    ttl: SignedDuration,
}

impl AdminTokenAuthority {
    /// Create an authority with the default 8 hour lifetime.
    #[must_use]
    pub fn new(key: SigningKey, allowlist: AdminAllowlist) -> Self {
        Self {
            key,
            allowlist,
            ttl: ADMIN_SESSION_TTL,
        }
    }

    /// Override the session lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: SignedDuration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The allowlist this authority enforces.
    pub fn allowlist(&self) -> &AdminAllowlist {
        &self.allowlist
    }

    /// Session lifetime.
    pub const fn ttl(&self) -> SignedDuration {
        self.ttl
    }

    /// Issue a token for `email` at `now`.
    ///
    /// Claims carry whole seconds, so the returned session is truncated to
    /// match what [`verify`](Self::verify) later reads back.
    ///
    /// # Errors
    ///
    /// Returns [`AdminTokenError::NotAllowed`] for emails outside the
    /// allowlist, or an error when the claims cannot be encoded.
    pub fn issue(&self, email: &str, now: Timestamp) -> Result<IssuedAdminToken, AdminTokenError> {
        let email = normalize_email(email);

        if !self.allowlist.permits(&email) {
            return Err(AdminTokenError::NotAllowed);
        }

        let now = whole_seconds(now)?;
        let expires_at = now.checked_add(self.ttl).map_err(AdminTokenError::Lifetime)?;
        let expires_at = whole_seconds(expires_at)?;

        let claims = AdminSessionClaims {
            email: email.clone(),
            iat: now.as_second(),
            exp: expires_at.as_second(),
        };

        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).map_err(AdminTokenError::Encoding)?);

        let signature = self.encoded_signature(&payload);

        Ok(IssuedAdminToken {
            token: format!("{payload}.{signature}"),
            session: AdminSession {
                email,
                issued_at: now,
                expires_at,
            },
        })
    }

    /// Verify `token` at `now`.
    ///
    /// Any malformed, forged, expired or no-longer-allowlisted token yields
    /// `None`.
    pub fn verify(&self, token: &str, now: Timestamp) -> Option<AdminSession> {
        let (payload, signature) = token.trim().split_once('.')?;

        let expected = self.encoded_signature(payload);

        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return None;
        }

        let claims: AdminSessionClaims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).ok()?).ok()?;

        let issued_at = Timestamp::from_second(claims.iat).ok()?;
        let expires_at = Timestamp::from_second(claims.exp).ok()?;

        if expires_at <= now {
            return None;
        }

        let email = normalize_email(&claims.email);

        if !self.allowlist.permits(&email) {
            return None;
        }

        Some(AdminSession {
            email,
            issued_at,
            expires_at,
        })
    }

    fn encoded_signature(&self, payload: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.key.sign(payload.as_bytes()))
    }
}

fn whole_seconds(at: Timestamp) -> Result<Timestamp, AdminTokenError> {
    Timestamp::from_second(at.as_second()).map_err(AdminTokenError::Lifetime)
}
