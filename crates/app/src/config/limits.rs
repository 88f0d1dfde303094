//! Rate Limit Config

use clap::Args;
use lealtad::rate_limit::RateLimit;

/// Per-operation rate limits.
#[derive(Debug, Args)]
pub struct RateLimitConfig {
    /// Staff PIN login attempts per window
    #[arg(long, env = "PIN_LOGIN_LIMIT", default_value_t = 5)]
    pub pin_login_limit: u32,

    /// Staff PIN login window in seconds
    #[arg(long, env = "PIN_LOGIN_WINDOW_SECONDS", default_value_t = 900)]
    pub pin_login_window_seconds: u64,

    /// Failed admin logins per window
    #[arg(long, env = "ADMIN_LOGIN_LIMIT", default_value_t = 5)]
    pub admin_login_limit: u32,

    /// Admin login window in seconds
    #[arg(long, env = "ADMIN_LOGIN_WINDOW_SECONDS", default_value_t = 900)]
    pub admin_login_window_seconds: u64,

    /// SSO exchanges per window
    #[arg(long, env = "SSO_LIMIT", default_value_t = 10)]
    pub sso_limit: u32,

    /// SSO window in seconds
    #[arg(long, env = "SSO_WINDOW_SECONDS", default_value_t = 60)]
    pub sso_window_seconds: u64,

    /// Public form submissions per window
    #[arg(long, env = "SUBMISSION_LIMIT", default_value_t = 20)]
    pub submission_limit: u32,

    /// Public form submission window in seconds
    #[arg(long, env = "SUBMISSION_WINDOW_SECONDS", default_value_t = 60)]
    pub submission_window_seconds: u64,
}

impl RateLimitConfig {
    /// Staff PIN login limit.
    #[must_use]
    pub const fn pin_login(&self) -> RateLimit {
        RateLimit::per_seconds(self.pin_login_limit, self.pin_login_window_seconds)
    }

    /// Admin login failure limit.
    #[must_use]
    pub const fn admin_login(&self) -> RateLimit {
        RateLimit::per_seconds(self.admin_login_limit, self.admin_login_window_seconds)
    }

    /// SSO exchange limit.
    #[must_use]
    pub const fn sso(&self) -> RateLimit {
        RateLimit::per_seconds(self.sso_limit, self.sso_window_seconds)
    }

    /// Public submission limit.
    #[must_use]
    pub const fn submission(&self) -> RateLimit {
        RateLimit::per_seconds(self.submission_limit, self.submission_window_seconds)
    }
}
