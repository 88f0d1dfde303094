//! Public Submissions
//!
//! Customer-facing forms (sign-ups, stamp claims) are unauthenticated, so each
//! one is throttled per client and tenant before any work is done.

use lealtad::rate_limit::{RateLimit, RateLimiter, rate_limit_key};
use thiserror::Error;
use tracing::warn;

use crate::gate::Denial;

const SUBMISSION_OPERATION: &str = "submission";

/// Submission refusals.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Too many submissions from this client for this tenant.
    #[error("too many submissions")]
    RateLimited {
        /// Seconds until submissions are accepted again.
        retry_after_seconds: u64,
    },
}

impl From<SubmissionError> for Denial {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::RateLimited {
                retry_after_seconds,
            } => Self::too_many_requests(retry_after_seconds),
        }
    }
}

/// Throttles public form submissions.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    limiter: RateLimiter,
    limit: RateLimit,
}

impl SubmissionGuard {
    /// Create a new guard.
    #[must_use]
    pub fn new(limiter: RateLimiter, limit: RateLimit) -> Self {
        Self { limiter, limit }
    }

    /// Count one submission from `client_ip` to the tenant at `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::RateLimited`] once the window is full.
    pub fn admit(&self, client_ip: &str, slug: &str) -> Result<(), SubmissionError> {
        let key = rate_limit_key(SUBMISSION_OPERATION, client_ip, slug);
        let decision = self.limiter.check_rate_limit(&key, self.limit);

        if decision.allowed {
            return Ok(());
        }

        warn!(slug, "public submission rate limited");

        Err(SubmissionError::RateLimited {
            retry_after_seconds: decision.retry_after_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn guard() -> SubmissionGuard {
        SubmissionGuard::new(RateLimiter::default(), RateLimit::per_seconds(3, 60))
    }

    #[test]
    fn window_fills_then_refuses_with_retry_after() -> TestResult {
        let guard = guard();

        for _ in 0..3 {
            guard.admit("10.0.0.1", "cafe-luna")?;
        }

        let error = guard
            .admit("10.0.0.1", "cafe-luna")
            .err()
            .ok_or("expected rate limit")?;

        let denial = Denial::from(error);

        assert_eq!(denial.status, 429);
        assert!(denial.retry_after_seconds.is_some_and(|seconds| (1..=60).contains(&seconds)));

        Ok(())
    }

    #[test]
    fn buckets_are_per_client_and_tenant() -> TestResult {
        let guard = guard();

        for _ in 0..3 {
            guard.admit("10.0.0.2", "cafe-luna")?;
        }

        guard.admit("10.0.0.3", "cafe-luna")?;
        guard.admit("10.0.0.2", "panaderia-sol")?;

        assert!(guard.admit("10.0.0.2", "cafe-luna").is_err());

        Ok(())
    }
}
