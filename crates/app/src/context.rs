//! App Context

use std::sync::Arc;

use lealtad::{
    rate_limit::RateLimiter,
    tokens::{AdminTokenAuthority, SessionCookie, SigningKey, SigningKeyError, SsoSecret},
};
use thiserror::Error;

use crate::{
    admin::AdminAuthService,
    campaigns::CampaignService,
    config::EngineConfig,
    gate::AuthorizationGate,
    identity::{IdentityProvider, RestIdentityProvider},
    notifications::{LogDispatcher, NotificationDispatcher},
    programs::ProgramService,
    rewards::RedemptionService,
    sso::SsoService,
    staff::StaffAuthService,
    store::{RecordStore, RestRecordStore},
    submissions::SubmissionGuard,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("invalid session secret")]
    SessionSecret(#[source] SigningKeyError),
}

/// Every service, wired to shared collaborators.
#[derive(Clone)]
pub struct AppContext {
    pub gate: AuthorizationGate,
    pub admin: AdminAuthService,
    pub sso: SsoService,
    pub staff: StaffAuthService,
    pub rewards: RedemptionService,
    pub campaigns: CampaignService,
    pub programs: ProgramService,
    pub submissions: SubmissionGuard,
    pub limiter: RateLimiter,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the session secret is unusable.
    pub fn from_config(config: &EngineConfig) -> Result<Self, AppInitError> {
        let store: Arc<dyn RecordStore> = Arc::new(RestRecordStore::new(config.store.rest()));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(RestIdentityProvider::new(config.store.rest()));

        Self::with_collaborators(config, store, identity, Arc::new(LogDispatcher))
    }

    /// Build application context around the given collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error when the session secret is unusable.
    pub fn with_collaborators(
        config: &EngineConfig,
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Result<Self, AppInitError> {
        let key = SigningKey::new(config.session.session_secret.as_bytes())
            .map_err(AppInitError::SessionSecret)?;

        let allowlist = config.session.allowlist();
        let limiter = RateLimiter::default();

        let authority =
            AdminTokenAuthority::new(key, allowlist.clone()).with_ttl(config.session.ttl());

        Ok(Self {
            gate: AuthorizationGate::new(Arc::clone(&identity), Arc::clone(&store), allowlist),
            admin: AdminAuthService::new(
                identity,
                authority,
                SessionCookie::new(config.session.cookie_name.clone(), config.session.ttl()),
                limiter.clone(),
                config.limits.admin_login(),
            ),
            sso: SsoService::new(
                Arc::clone(&store),
                SsoSecret::new(config.sso.shared_secret.as_bytes()),
                config.sso.token_ttl(),
                limiter.clone(),
                config.limits.sso(),
            ),
            staff: StaffAuthService::new(
                Arc::clone(&store),
                limiter.clone(),
                config.limits.pin_login(),
            ),
            rewards: RedemptionService::new(Arc::clone(&store), config.rewards.expiration_days),
            campaigns: CampaignService::new(Arc::clone(&store), dispatcher),
            programs: ProgramService::new(store),
            submissions: SubmissionGuard::new(limiter.clone(), config.limits.submission()),
            limiter,
        })
    }
}
