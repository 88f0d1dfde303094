//! SSO Config

use clap::Args;
use jiff::SignedDuration;

/// Cross-application SSO settings.
#[derive(Debug, Args)]
pub struct SsoConfig {
    /// Secret shared with the calling application; unset disables SSO
    #[arg(
        long = "sso-shared-secret",
        env = "SSO_SHARED_SECRET",
        hide_env_values = true,
        default_value = ""
    )]
    pub shared_secret: String,

    /// Lifetime of issued exchange tokens in seconds
    #[arg(long = "sso-token-ttl-seconds", env = "SSO_TOKEN_TTL_SECONDS", default_value_t = 60)]
    pub token_ttl_seconds: i64,
}

impl SsoConfig {
    /// Exchange token lifetime.
    #[must_use]
    pub const fn token_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.token_ttl_seconds)
    }
}
