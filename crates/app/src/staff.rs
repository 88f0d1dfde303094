//! Staff PIN login.

use std::{sync::Arc, time::Instant};

use lealtad::{
    pins::{is_valid_pin, verify_pin},
    rate_limit::{RateLimit, RateLimiter, rate_limit_key},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    gate::Denial,
    store::{RecordStore, StoreError, TenantRecord, TenantStatus},
};

const STAFF_PIN_OPERATION: &str = "staff-pin";

/// Well-formed hash no PIN derives to; unknown tenants are checked against it
/// so both failure paths pay for one key derivation.
const DECOY_PIN_HASH: &str = concat!(
    "scrypt$0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f$",
    "a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5",
    "a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5",
);

/// Staff login failures.
#[derive(Debug, Error)]
pub enum StaffAuthError {
    /// The PIN is not four digits.
    #[error("invalid PIN format")]
    InvalidFormat,

    /// Too many failed attempts for this tenant from this client.
    #[error("too many attempts")]
    RateLimited {
        /// Seconds until attempts are accepted again.
        retry_after_seconds: u64,
    },

    /// Unknown tenant or wrong PIN. Both run one PIN derivation and return
    /// the same error.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The tenant is paused or suspended.
    #[error("tenant inactive")]
    Inactive,

    /// The store failed.
    #[error("storage error")]
    Store(#[source] StoreError),

    /// The verification task did not complete.
    #[error("verification failed")]
    Verification(#[source] tokio::task::JoinError),
}

impl From<StoreError> for StaffAuthError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<StaffAuthError> for Denial {
    fn from(error: StaffAuthError) -> Self {
        match error {
            StaffAuthError::InvalidFormat => Self::bad_request("invalid PIN format"),
            StaffAuthError::RateLimited {
                retry_after_seconds,
            } => Self::too_many_requests(retry_after_seconds),
            StaffAuthError::InvalidCredentials => Self::unauthorized(),
            StaffAuthError::Inactive => Self::forbidden("tenant inactive"),
            StaffAuthError::Store(_) | StaffAuthError::Verification(_) => Self::internal(),
        }
    }
}

/// Staff PIN login for a tenant's point of sale.
#[derive(Clone)]
pub struct StaffAuthService {
    store: Arc<dyn RecordStore>,
    limiter: RateLimiter,
    limit: RateLimit,
}

impl StaffAuthService {
    /// Create a new service.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, limiter: RateLimiter, limit: RateLimit) -> Self {
        Self {
            store,
            limiter,
            limit,
        }
    }

    /// Check `pin` for the tenant at `slug`.
    ///
    /// # Errors
    ///
    /// A rate-limited client is refused before the store is queried. Unknown
    /// tenants and wrong PINs both count as failures.
    #[tracing::instrument(name = "staff.login", skip(self, pin), err)]
    pub async fn login(
        &self,
        slug: &str,
        pin: &str,
        client_ip: &str,
    ) -> Result<TenantRecord, StaffAuthError> {
        if !is_valid_pin(pin) {
            return Err(StaffAuthError::InvalidFormat);
        }

        let key = rate_limit_key(STAFF_PIN_OPERATION, client_ip, slug);
        let decision = self.limiter.peek_at(&key, self.limit, Instant::now());

        if !decision.allowed {
            warn!("staff login rate limited");

            return Err(StaffAuthError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            });
        }

        let Some(tenant) = self.store.find_tenant_by_slug(slug).await? else {
            check_pin(pin, Some(DECOY_PIN_HASH.to_string()), None).await?;
            self.limiter.record_failure(&key, self.limit, Instant::now());

            return Err(StaffAuthError::InvalidCredentials);
        };

        let verified = check_pin(pin, tenant.pin_hash.clone(), tenant.pin.clone()).await?;

        if !verified {
            self.limiter.record_failure(&key, self.limit, Instant::now());
            warn!(tenant_id = %tenant.id, "staff login with wrong PIN");

            return Err(StaffAuthError::InvalidCredentials);
        }

        if tenant.estado != TenantStatus::Activo {
            return Err(StaffAuthError::Inactive);
        }

        self.limiter.clear(&key);

        info!(tenant_id = %tenant.id, "staff signed in");

        Ok(tenant)
    }
}

async fn check_pin(
    pin: &str,
    stored_hash: Option<String>,
    legacy: Option<String>,
) -> Result<bool, StaffAuthError> {
    let candidate = pin.to_string();

    tokio::task::spawn_blocking(move || {
        verify_pin(&candidate, stored_hash.as_deref(), legacy.as_deref())
    })
    .await
    .map_err(|source| {
        error!(error = %source, "pin verification task failed");
        StaffAuthError::Verification(source)
    })
}
