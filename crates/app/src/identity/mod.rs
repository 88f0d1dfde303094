//! Identity Provider
//!
//! External identity/session service. Admin logins, tenant-owner checks and
//! the OAuth callback all resolve callers through [`IdentityProvider`].

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use thiserror::Error;

mod rest;

pub use rest::RestIdentityProvider;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    /// Provider user id; tenants reference it as `auth_user_id`.
    pub id: String,

    /// Verified email, when the provider has one.
    #[serde(default)]
    pub email: Option<String>,
}

/// A session granted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentitySession {
    /// Bearer token for subsequent `current_identity` calls.
    pub access_token: String,

    /// The signed-in caller.
    pub user: Identity,
}

/// Identity provider failures.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Transport or decoding failure.
    #[error("identity provider request failed")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an unexpected status.
    #[error("identity provider returned status {0}")]
    Status(u16),
}

/// Caller resolution and sign-in.
#[automock]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity behind a session token; `None` for missing or invalid sessions.
    async fn current_identity(&self, session: &str) -> Result<Option<Identity>, IdentityError>;

    /// Password sign-in; `None` for wrong credentials.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<IdentitySession>, IdentityError>;

    /// Exchange an OAuth authorization code for a session.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<Option<IdentitySession>, IdentityError>;
}
