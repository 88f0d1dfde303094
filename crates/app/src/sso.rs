//! SSO Exchange
//!
//! A linked external application trades the shared secret for a one-time
//! token bound to one tenant. The token is persisted with its expiry; the
//! consuming side enforces single use.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use lealtad::{
    rate_limit::{RateLimit, RateLimiter, rate_limit_key},
    tokens::{SsoGrant, SsoSecret},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    gate::Denial,
    store::{RecordStore, SsoTokenRecord, StoreError, TenantStatus, TenantUuid},
};

const SSO_OPERATION: &str = "sso";

/// Rate-limit scope for tenant ids that do not parse.
const UNPARSED_TENANT: &str = "invalid";

/// SSO issuance failures.
#[derive(Debug, Error)]
pub enum SsoError {
    /// Too many exchanges from this client.
    #[error("too many requests")]
    RateLimited {
        /// Seconds until exchanges are accepted again.
        retry_after_seconds: u64,
    },

    /// Missing, unconfigured or wrong shared secret.
    #[error("unauthorized")]
    InvalidSecret,

    /// The tenant id is not a valid identifier.
    #[error("invalid tenant")]
    InvalidTenant,

    /// No tenant with that id.
    #[error("tenant not found")]
    TenantNotFound,

    /// The tenant has no linked owner account.
    #[error("tenant not linked")]
    NotLinked,

    /// The tenant is suspended.
    #[error("tenant suspended")]
    Suspended,

    /// The store failed.
    #[error("storage error")]
    Store(#[source] StoreError),

    /// The expiry could not be represented.
    #[error("invalid token lifetime")]
    Lifetime(#[source] jiff::Error),
}

impl From<StoreError> for SsoError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<SsoError> for Denial {
    fn from(error: SsoError) -> Self {
        match error {
            SsoError::RateLimited {
                retry_after_seconds,
            } => Self::too_many_requests(retry_after_seconds),
            SsoError::InvalidSecret => Self::unauthorized(),
            SsoError::InvalidTenant => Self::bad_request("invalid tenant"),
            SsoError::TenantNotFound => Self::not_found(),
            SsoError::NotLinked | SsoError::Suspended => Self::forbidden("forbidden"),
            SsoError::Store(_) | SsoError::Lifetime(_) => Self::internal(),
        }
    }
}

/// An issued exchange token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SsoIssued {
    /// Hex exchange token.
    pub token: String,

    /// Public slug of the tenant the token is bound to.
    pub slug: String,

    /// When the token stops being accepted.
    pub expires_at: Timestamp,
}

/// Issues SSO exchange tokens.
#[derive(Clone)]
pub struct SsoService {
    store: Arc<dyn RecordStore>,
    secret: SsoSecret,
    ttl: SignedDuration,
    limiter: RateLimiter,
    limit: RateLimit,
}

impl SsoService {
    /// Create a new service.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        secret: SsoSecret,
        ttl: SignedDuration,
        limiter: RateLimiter,
        limit: RateLimit,
    ) -> Self {
        Self {
            store,
            secret,
            ttl,
            limiter,
            limit,
        }
    }

    /// Issue a token for `tenant_id` to a caller presenting `provided_secret`.
    ///
    /// # Errors
    ///
    /// Rate limiting and the secret are checked before the store is touched.
    /// Unknown, unlinked and suspended tenants never receive a token.
    /// Unparseable tenant ids share one rate-limit bucket per client.
    #[tracing::instrument(name = "sso.issue", skip(self, provided_secret), err)]
    pub async fn issue(
        &self,
        tenant_id: &str,
        provided_secret: &str,
        client_ip: &str,
        now: Timestamp,
    ) -> Result<SsoIssued, SsoError> {
        let parsed = tenant_id.trim().parse::<TenantUuid>().ok();
        let scope = parsed.map_or_else(|| UNPARSED_TENANT.to_string(), |id| id.to_string());

        let decision = self
            .limiter
            .check_rate_limit(&rate_limit_key(SSO_OPERATION, client_ip, &scope), self.limit);

        if !decision.allowed {
            warn!("sso exchange rate limited");

            return Err(SsoError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            });
        }

        if !self.secret.is_configured() {
            warn!("sso exchange attempted without a configured secret");

            return Err(SsoError::InvalidSecret);
        }

        if !self.secret.matches(provided_secret) {
            warn!("sso exchange with invalid secret");

            return Err(SsoError::InvalidSecret);
        }

        let id = parsed.ok_or(SsoError::InvalidTenant)?;

        let tenant = self
            .store
            .find_tenant_by_id(id)
            .await?
            .ok_or(SsoError::TenantNotFound)?;

        if tenant.auth_user_id.as_deref().is_none_or(str::is_empty) {
            return Err(SsoError::NotLinked);
        }

        if tenant.estado == TenantStatus::Suspended {
            warn!(tenant_id = %tenant.id, "sso exchange for suspended tenant");

            return Err(SsoError::Suspended);
        }

        let grant = SsoGrant::issue(now, self.ttl).map_err(SsoError::Lifetime)?;

        self.store
            .insert_sso_token(&SsoTokenRecord {
                tenant_id: tenant.id,
                token: grant.token.clone(),
                expires_at: grant.expires_at,
            })
            .await
            .inspect_err(|source| error!(error = %source, "failed to persist sso token"))?;

        info!(tenant_id = %tenant.id, expires_at = %grant.expires_at, "sso token issued");

        Ok(SsoIssued {
            token: grant.token,
            slug: tenant.slug,
            expires_at: grant.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use lealtad::rate_limit::InMemoryCounter;
    use testresult::TestResult;

    use crate::{store::MockRecordStore, test_helpers::tenant};

    use super::*;

    const SECRET: &str = "shared-sso-secret";

    fn service(store: MockRecordStore, secret: &str) -> SsoService {
        SsoService::new(
            Arc::new(store),
            SsoSecret::new(secret),
            SignedDuration::from_secs(60),
            RateLimiter::default(),
            RateLimit::per_seconds(2, 60),
        )
    }

    #[tokio::test]
    async fn linked_tenant_gets_persisted_token() -> TestResult {
        let record = tenant("cafe-luna");
        let id = record.id;

        let mut store = MockRecordStore::new();

        store
            .expect_find_tenant_by_id()
            .once()
            .withf(move |tenant| *tenant == id)
            .return_once(move |_| Ok(Some(record)));

        store
            .expect_insert_sso_token()
            .once()
            .withf(move |token| token.tenant_id == id && token.token.len() == 64)
            .return_once(|_| Ok(()));

        let now = Timestamp::now();

        let issued = service(store, SECRET)
            .issue(&id.to_string(), SECRET, "10.0.0.1", now)
            .await?;

        assert_eq!(issued.slug, "cafe-luna");
        assert_eq!(issued.expires_at, now.checked_add(SignedDuration::from_secs(60))?);
        assert!(issued.token.chars().all(|c| c.is_ascii_hexdigit()));

        Ok(())
    }

    #[tokio::test]
    async fn wrong_or_missing_secret_never_reaches_store() -> TestResult {
        let mut store = MockRecordStore::new();

        store.expect_find_tenant_by_id().never();
        store.expect_insert_sso_token().never();

        let service = service(store, SECRET);
        let id = TenantUuid::new().to_string();

        for (i, provided) in ["short", "shared-sso-secreT", ""].into_iter().enumerate() {
            let error = service
                .issue(&id, provided, &format!("10.0.2.{i}"), Timestamp::now())
                .await
                .err()
                .ok_or("expected refusal")?;

            assert!(matches!(error, SsoError::InvalidSecret));
        }

        Ok(())
    }

    #[tokio::test]
    async fn unconfigured_secret_rejects_empty_secret() -> TestResult {
        let error = service(MockRecordStore::new(), "")
            .issue(&TenantUuid::new().to_string(), "", "10.0.0.3", Timestamp::now())
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(error, SsoError::InvalidSecret));

        Ok(())
    }

    #[tokio::test]
    async fn suspended_tenant_never_receives_token() -> TestResult {
        let mut record = tenant("cafe-luna");

        record.estado = TenantStatus::Suspended;

        let id = record.id;
        let mut store = MockRecordStore::new();

        store
            .expect_find_tenant_by_id()
            .once()
            .return_once(move |_| Ok(Some(record)));

        store.expect_insert_sso_token().never();

        let error = service(store, SECRET)
            .issue(&id.to_string(), SECRET, "10.0.0.4", Timestamp::now())
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(error, SsoError::Suspended));
        assert_eq!(Denial::from(error).status, 403);

        Ok(())
    }

    #[tokio::test]
    async fn unlinked_and_unknown_tenants_are_refused() -> TestResult {
        let mut record = tenant("cafe-luna");

        record.auth_user_id = None;

        let mut store = MockRecordStore::new();

        store
            .expect_find_tenant_by_id()
            .once()
            .return_once(move |_| Ok(Some(record)));

        let error = service(store, SECRET)
            .issue(&TenantUuid::new().to_string(), SECRET, "10.0.0.5", Timestamp::now())
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(error, SsoError::NotLinked));

        let mut store = MockRecordStore::new();

        store
            .expect_find_tenant_by_id()
            .once()
            .return_once(|_| Ok(None));

        let error = service(store, SECRET)
            .issue(&TenantUuid::new().to_string(), SECRET, "10.0.0.5", Timestamp::now())
            .await
            .err()
            .ok_or("expected refusal")?;

        assert!(matches!(error, SsoError::TenantNotFound));

        Ok(())
    }

    #[tokio::test]
    async fn exchanges_are_rate_limited_per_client_and_tenant() -> TestResult {
        let service = service(MockRecordStore::new(), SECRET);
        let id = TenantUuid::new().to_string();

        for _ in 0..2 {
            let error = service
                .issue(&id, "wrong", "10.0.0.6", Timestamp::now())
                .await
                .err()
                .ok_or("expected refusal")?;

            assert!(matches!(error, SsoError::InvalidSecret));
        }

        let error = service
            .issue(&id, SECRET, "10.0.0.6", Timestamp::now())
            .await
            .err()
            .ok_or("expected rate limit")?;

        assert!(matches!(error, SsoError::RateLimited { .. }));

        let denial = Denial::from(error);

        assert_eq!(denial.status, 429);
        assert!(denial.retry_after_seconds.is_some_and(|seconds| (1..=60).contains(&seconds)));

        Ok(())
    }

    #[tokio::test]
    async fn junk_tenant_ids_share_one_bucket_per_client() -> TestResult {
        let counter = Arc::new(InMemoryCounter::new());

        let service = SsoService::new(
            Arc::new(MockRecordStore::new()),
            SsoSecret::new(SECRET),
            SignedDuration::from_secs(60),
            RateLimiter::new(counter.clone()),
            RateLimit::per_seconds(2, 60),
        );

        for junk in ["not-a-uuid", "also-junk"] {
            let error = service
                .issue(junk, SECRET, "10.0.0.7", Timestamp::now())
                .await
                .err()
                .ok_or("expected refusal")?;

            assert!(matches!(error, SsoError::InvalidTenant));
        }

        let error = service
            .issue("yet-more-junk", SECRET, "10.0.0.7", Timestamp::now())
            .await
            .err()
            .ok_or("expected rate limit")?;

        assert!(matches!(error, SsoError::RateLimited { .. }));
        assert_eq!(counter.len(), 1);

        Ok(())
    }
}
