//! Admin Sessions
//!
//! Platform operators sign in with their identity-provider password and get
//! an HMAC-signed session cookie. Failed attempts are tracked per client and
//! email; a successful login clears the tracker.

use std::{sync::Arc, time::Instant};

use jiff::Timestamp;
use lealtad::{
    rate_limit::{RateLimit, RateLimiter, rate_limit_key},
    tokens::{AdminSession, AdminTokenAuthority, AdminTokenError, SessionCookie, normalize_email},
};
use thiserror::Error;
use tracing::{Span, error, info, warn};

use crate::{
    gate::Denial,
    identity::{IdentityError, IdentityProvider},
};

const ADMIN_LOGIN_OPERATION: &str = "admin-login";

/// Admin login failures.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Too many failed attempts from this client for this email.
    #[error("too many attempts")]
    RateLimited {
        /// Seconds until attempts are accepted again.
        retry_after_seconds: u64,
    },

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Valid credentials, but not an operator.
    #[error("not authorized")]
    NotAllowed,

    /// The identity provider failed.
    #[error("identity provider error")]
    Identity(#[source] IdentityError),

    /// The session token could not be issued.
    #[error("session error")]
    Token(#[source] AdminTokenError),
}

impl From<IdentityError> for AdminAuthError {
    fn from(error: IdentityError) -> Self {
        Self::Identity(error)
    }
}

impl From<AdminTokenError> for AdminAuthError {
    fn from(error: AdminTokenError) -> Self {
        match error {
            AdminTokenError::NotAllowed => Self::NotAllowed,
            other => Self::Token(other),
        }
    }
}

impl From<AdminAuthError> for Denial {
    fn from(error: AdminAuthError) -> Self {
        match error {
            AdminAuthError::RateLimited {
                retry_after_seconds,
            } => Self::too_many_requests(retry_after_seconds),
            AdminAuthError::InvalidCredentials => Self::unauthorized(),
            AdminAuthError::NotAllowed => Self::forbidden("forbidden"),
            AdminAuthError::Identity(_) | AdminAuthError::Token(_) => Self::internal(),
        }
    }
}

/// A successful admin login.
#[derive(Debug, Clone)]
pub struct AdminLogin {
    /// Verified session claims.
    pub session: AdminSession,

    /// `Set-Cookie` value carrying the session token.
    pub set_cookie: String,
}

/// Admin login, session check and logout.
#[derive(Clone)]
pub struct AdminAuthService {
    identity: Arc<dyn IdentityProvider>,
    authority: AdminTokenAuthority,
    cookie: SessionCookie,
    limiter: RateLimiter,
    limit: RateLimit,
}

impl AdminAuthService {
    /// Create a new service.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        authority: AdminTokenAuthority,
        cookie: SessionCookie,
        limiter: RateLimiter,
        limit: RateLimit,
    ) -> Self {
        Self {
            identity,
            authority,
            cookie,
            limiter,
            limit,
        }
    }

    /// Sign an operator in.
    ///
    /// # Errors
    ///
    /// Returns [`AdminAuthError::RateLimited`] before contacting the identity
    /// provider once the failure limit is reached; wrong credentials and
    /// non-operators count as failures.
    #[tracing::instrument(
        name = "admin.login",
        skip(self, email, password),
        fields(email = tracing::field::Empty),
        err
    )]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client_ip: &str,
        now: Timestamp,
    ) -> Result<AdminLogin, AdminAuthError> {
        let email = normalize_email(email);
        let key = rate_limit_key(ADMIN_LOGIN_OPERATION, client_ip, &email);

        Span::current().record("email", email.as_str());

        let decision = self.limiter.peek_at(&key, self.limit, Instant::now());

        if !decision.allowed {
            warn!("admin login rate limited");

            return Err(AdminAuthError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            });
        }

        let Some(signed_in) = self.identity.sign_in_with_password(&email, password).await? else {
            self.limiter.record_failure(&key, self.limit, Instant::now());
            warn!("admin login with invalid credentials");

            return Err(AdminAuthError::InvalidCredentials);
        };

        let verified = signed_in.user.email.as_deref().unwrap_or(&email);

        let issued = match self.authority.issue(verified, now) {
            Ok(issued) => issued,
            Err(AdminTokenError::NotAllowed) => {
                self.limiter.record_failure(&key, self.limit, Instant::now());
                warn!("admin login by non-operator");

                return Err(AdminAuthError::NotAllowed);
            }
            Err(other) => {
                error!(error = %other, "failed to issue admin token");

                return Err(other.into());
            }
        };

        self.limiter.clear(&key);

        info!(expires_at = %issued.session.expires_at, "admin signed in");

        Ok(AdminLogin {
            set_cookie: self.cookie.set_value(&issued.token),
            session: issued.session,
        })
    }

    /// The session carried by a `Cookie` request header, if valid at `now`.
    pub fn authenticate(&self, cookie_header: &str, now: Timestamp) -> Option<AdminSession> {
        let token = self.cookie.read(cookie_header)?;

        self.authority.verify(token, now)
    }

    /// `Set-Cookie` value that ends the session.
    #[must_use]
    pub fn logout(&self) -> String {
        self.cookie.clear_value()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use lealtad::tokens::{AdminAllowlist, SigningKey};
    use testresult::TestResult;

    use crate::{
        identity::{IdentitySession, MockIdentityProvider},
        test_helpers::identity,
    };

    use super::*;

    fn service(
        provider: MockIdentityProvider,
    ) -> Result<AdminAuthService, lealtad::tokens::SigningKeyError> {
        Ok(AdminAuthService::new(
            Arc::new(provider),
            AdminTokenAuthority::new(
                SigningKey::new("admin-session-secret")?,
                AdminAllowlist::from_csv("ops@lealtad.app"),
            ),
            SessionCookie::default(),
            RateLimiter::default(),
            RateLimit::per_seconds(2, 900),
        ))
    }

    fn session(email: &str) -> IdentitySession {
        IdentitySession {
            access_token: "access".to_string(),
            user: identity(email),
        }
    }

    #[tokio::test]
    async fn operator_login_sets_cookie_that_authenticates() -> TestResult {
        let mut provider = MockIdentityProvider::new();

        provider
            .expect_sign_in_with_password()
            .once()
            .withf(|email, password| email == "ops@lealtad.app" && password == "hunter2")
            .return_once(|_, _| Ok(Some(session("ops@lealtad.app"))));

        let service = service(provider)?;
        let now = Timestamp::now();

        let login = service.login(" OPS@lealtad.app ", "hunter2", "10.0.0.1", now).await?;

        assert_eq!(login.session.email, "ops@lealtad.app");
        assert_eq!(login.session.issued_at.as_second(), now.as_second());
        assert_eq!(
            login.session.expires_at,
            login.session.issued_at.checked_add(SignedDuration::from_hours(8))?
        );
        assert!(login.set_cookie.starts_with("lealtad_admin="));
        assert!(login.set_cookie.contains("HttpOnly"));

        let header = login
            .set_cookie
            .split(';')
            .next()
            .ok_or("missing cookie pair")?;

        let authenticated = service
            .authenticate(&format!("theme=dark; {header}"), now)
            .ok_or("expected session")?;

        assert_eq!(authenticated.email, "ops@lealtad.app");
        assert!(service.authenticate(header, login.session.expires_at).is_none());

        Ok(())
    }

    #[tokio::test]
    async fn non_operator_is_refused_and_counted() -> TestResult {
        let mut provider = MockIdentityProvider::new();

        provider
            .expect_sign_in_with_password()
            .times(2)
            .returning(|_, _| Ok(Some(session("owner@example.com"))));

        let service = service(provider)?;
        let now = Timestamp::now();

        for _ in 0..2 {
            let error = service
                .login("owner@example.com", "pw", "10.0.0.2", now)
                .await
                .err()
                .ok_or("expected refusal")?;

            assert!(matches!(error, AdminAuthError::NotAllowed));
        }

        let error = service
            .login("owner@example.com", "pw", "10.0.0.2", now)
            .await
            .err()
            .ok_or("expected rate limit")?;

        assert!(matches!(error, AdminAuthError::RateLimited { .. }));

        let denial = Denial::from(error);

        assert_eq!(denial.status, 429);
        assert!(denial.retry_after_seconds.is_some_and(|seconds| (1..=900).contains(&seconds)));

        Ok(())
    }

    #[tokio::test]
    async fn success_clears_failures() -> TestResult {
        let mut provider = MockIdentityProvider::new();
        let mut attempts = 0;

        provider
            .expect_sign_in_with_password()
            .times(3)
            .returning(move |_, _| {
                attempts += 1;

                if attempts == 2 {
                    Ok(Some(session("ops@lealtad.app")))
                } else {
                    Ok(None)
                }
            });

        let service = service(provider)?;
        let now = Timestamp::now();

        assert!(service.login("ops@lealtad.app", "bad", "10.0.0.3", now).await.is_err());
        assert!(service.login("ops@lealtad.app", "good", "10.0.0.3", now).await.is_ok());

        let error = service
            .login("ops@lealtad.app", "bad", "10.0.0.3", now)
            .await
            .err()
            .ok_or("expected invalid credentials")?;

        assert!(matches!(error, AdminAuthError::InvalidCredentials));

        Ok(())
    }

    #[test]
    fn logout_clears_cookie() -> TestResult {
        let service = service(MockIdentityProvider::new())?;

        assert!(service.logout().contains("Max-Age=0"));

        Ok(())
    }
}
