//! Gate denials.

use thiserror::Error;

/// A ready-to-return refusal: HTTP status plus a short reason.
///
/// Reasons never carry identifiers or provider detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{status} {reason}")]
pub struct Denial {
    /// HTTP status code.
    pub status: u16,

    /// Caller-facing reason.
    pub reason: &'static str,

    /// Value for a `Retry-After` header; only set on 429.
    pub retry_after_seconds: Option<u64>,
}

impl Denial {
    const fn new(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            retry_after_seconds: None,
        }
    }

    /// 400
    #[must_use]
    pub const fn bad_request(reason: &'static str) -> Self {
        Self::new(400, reason)
    }

    /// 401
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self::new(401, "unauthorized")
    }

    /// 403
    #[must_use]
    pub const fn forbidden(reason: &'static str) -> Self {
        Self::new(403, reason)
    }

    /// 404
    #[must_use]
    pub const fn not_found() -> Self {
        Self::new(404, "not found")
    }

    /// 409
    #[must_use]
    pub const fn conflict(reason: &'static str) -> Self {
        Self::new(409, reason)
    }

    /// 410
    #[must_use]
    pub const fn gone(reason: &'static str) -> Self {
        Self::new(410, reason)
    }

    /// 429, telling the caller when to come back.
    #[must_use]
    pub const fn too_many_requests(retry_after_seconds: u64) -> Self {
        Self {
            status: 429,
            reason: "too many requests",
            retry_after_seconds: Some(retry_after_seconds),
        }
    }

    /// 500
    #[must_use]
    pub const fn internal() -> Self {
        Self::new(500, "internal error")
    }
}
