//! Admin Session Config

use clap::Args;
use jiff::SignedDuration;
use lealtad::tokens::{AdminAllowlist, DEFAULT_SESSION_COOKIE};

/// Admin session settings.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Secret used to sign admin session tokens
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// Comma-separated admin emails; empty falls back to the platform domain
    #[arg(long, env = "ADMIN_EMAILS", default_value = "")]
    pub admin_emails: String,

    /// Name of the admin session cookie
    #[arg(
        long = "session-cookie-name",
        env = "SESSION_COOKIE_NAME",
        default_value = DEFAULT_SESSION_COOKIE
    )]
    pub cookie_name: String,

    /// Admin session lifetime in hours
    #[arg(long = "session-ttl-hours", env = "SESSION_TTL_HOURS", default_value_t = 8)]
    pub ttl_hours: i64,
}

impl SessionConfig {
    /// Parsed admin allowlist.
    #[must_use]
    pub fn allowlist(&self) -> AdminAllowlist {
        AdminAllowlist::from_csv(&self.admin_emails)
    }

    /// Session lifetime.
    #[must_use]
    pub const fn ttl(&self) -> SignedDuration {
        SignedDuration::from_hours(self.ttl_hours)
    }
}
