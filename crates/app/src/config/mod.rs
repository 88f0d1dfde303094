//! Engine configuration module

use clap::Parser;

use crate::config::{
    limits::RateLimitConfig,
    logging::LoggingConfig,
    rewards::RewardConfig,
    session::SessionConfig,
    sso::SsoConfig,
    store::StoreConfig,
};

pub mod limits;
pub mod logging;
pub mod rewards;
pub mod session;
pub mod sso;
pub mod store;

/// Lealtad engine configuration
#[derive(Debug, Parser)]
#[command(
    name = "lealtad-engine",
    about = "Lealtad entitlement and loyalty engine",
    long_about = None
)]
pub struct EngineConfig {
    /// Admin session settings.
    #[command(flatten)]
    pub session: SessionConfig,

    /// SSO exchange settings.
    #[command(flatten)]
    pub sso: SsoConfig,

    /// Rate limits per operation.
    #[command(flatten)]
    pub limits: RateLimitConfig,

    /// Reward settings.
    #[command(flatten)]
    pub rewards: RewardConfig,

    /// Record store settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
