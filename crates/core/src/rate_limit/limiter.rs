//! Fixed-window rate limiter.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::rate_limit::{Counter, CounterState, InMemoryCounter};

/// Threshold and window for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Hits allowed per window.
    pub limit: u32,

    /// Window length.
    pub window: Duration,
}

impl RateLimit {
    /// `limit` hits per `window`.
    pub const fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window }
    }

    /// `limit` hits per `seconds`.
    pub const fn per_seconds(limit: u32, seconds: u64) -> Self {
        Self::new(limit, Duration::from_secs(seconds))
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the call may proceed.
    pub allowed: bool,

    /// Calls left in the current window.
    pub remaining: u32,

    /// Seconds until the window resets; zero when allowed.
    pub retry_after_seconds: u64,
}

impl RateLimitDecision {
    const fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after_seconds: 0,
        }
    }

    fn deny(state: CounterState, now: Instant) -> Self {
        let left = state.reset_at.saturating_duration_since(now);
        let partial = u64::from(left.subsec_nanos() > 0);

        Self {
            allowed: false,
            remaining: 0,
            retry_after_seconds: (left.as_secs() + partial).max(1),
        }
    }
}

/// Fixed-window limiter over a [`Counter`].
///
/// Counting is best-effort: the read and the increment are separate steps, so
/// racing callers may briefly overshoot the limit.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    counter: Arc<dyn Counter>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCounter::new()))
    }
}

impl RateLimiter {
    /// Limiter backed by `counter`.
    pub fn new(counter: Arc<dyn Counter>) -> Self {
        Self { counter }
    }

    /// Count a call against `key` now.
    pub fn check_rate_limit(&self, key: &str, limit: RateLimit) -> RateLimitDecision {
        self.check_at(key, limit, Instant::now())
    }

    /// Count a call against `key` at `now`.
    ///
    /// The first call of a window is always allowed and starts the count at
    /// one. Once the count reaches `limit`, further calls are denied without
    /// being counted until the window closes.
    pub fn check_at(&self, key: &str, limit: RateLimit, now: Instant) -> RateLimitDecision {
        if let Some(state) = self
            .counter
            .get(key, now)
            .filter(|state| state.count >= limit.limit)
        {
            return RateLimitDecision::deny(state, now);
        }

        let state = self.counter.increment(key, limit.window, now);

        RateLimitDecision::allow(limit.limit.saturating_sub(state.count))
    }

    /// Whether `key` is currently over `limit`, without counting a call.
    ///
    /// Paired with [`RateLimiter::record_failure`] for brute-force tracking,
    /// where only failed attempts count.
    pub fn peek_at(&self, key: &str, limit: RateLimit, now: Instant) -> RateLimitDecision {
        match self.counter.get(key, now) {
            Some(state) if state.count >= limit.limit => RateLimitDecision::deny(state, now),
            Some(state) => RateLimitDecision::allow(limit.limit.saturating_sub(state.count)),
            None => RateLimitDecision::allow(limit.limit),
        }
    }

    /// Count one failed attempt against `key`.
    pub fn record_failure(&self, key: &str, limit: RateLimit, now: Instant) {
        self.counter.increment(key, limit.window, now);
    }

    /// Forget every attempt recorded for `key`.
    pub fn clear(&self, key: &str) {
        self.counter.reset(key);
    }

    /// Drop stale windows.
    pub fn purge_expired(&self, now: Instant) {
        self.counter.purge_expired(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_PER_SECOND: RateLimit = RateLimit::new(3, Duration::from_millis(1_000));

    #[test]
    fn fourth_call_in_window_is_denied() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        let remaining = (0..3)
            .map(|_| limiter.check_at("k", THREE_PER_SECOND, now))
            .map(|decision| {
                assert!(decision.allowed);
                decision.remaining
            })
            .collect::<Vec<_>>();

        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = limiter.check_at("k", THREE_PER_SECOND, now + Duration::from_millis(200));

        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after_seconds >= 1);
    }

    #[test]
    fn new_window_resets_count() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        for _ in 0..4 {
            limiter.check_at("k", THREE_PER_SECOND, now);
        }

        let later = now + Duration::from_millis(1_000);
        let decision = limiter.check_at("k", THREE_PER_SECOND, later);

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
    }

    #[test]
    fn denied_calls_do_not_extend_the_window() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        for offset in 0..10 {
            limiter.check_at("k", THREE_PER_SECOND, now + Duration::from_millis(offset * 50));
        }

        let next_window = now + Duration::from_millis(1_001);

        assert!(limiter.check_at("k", THREE_PER_SECOND, next_window).allowed);
    }

    #[test]
    fn retry_after_rounds_up() {
        let limiter = RateLimiter::default();
        let now = Instant::now();
        let limit = RateLimit::per_seconds(1, 60);

        limiter.check_at("k", limit, now);

        let decision = limiter.check_at("k", limit, now + Duration::from_millis(500));

        assert_eq!(decision.retry_after_seconds, 60);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::default();
        let now = Instant::now();
        let limit = RateLimit::per_seconds(1, 60);

        assert!(limiter.check_at("a", limit, now).allowed);
        assert!(!limiter.check_at("a", limit, now).allowed);
        assert!(limiter.check_at("b", limit, now).allowed);
    }

    #[test]
    fn only_failures_count_toward_lockout() {
        let limiter = RateLimiter::default();
        let now = Instant::now();
        let limit = RateLimit::per_seconds(2, 900);

        assert!(limiter.peek_at("login", limit, now).allowed);

        limiter.record_failure("login", limit, now);

        assert_eq!(limiter.peek_at("login", limit, now).remaining, 1);

        limiter.record_failure("login", limit, now);

        assert!(!limiter.peek_at("login", limit, now).allowed);

        limiter.clear("login");

        assert!(limiter.peek_at("login", limit, now).allowed);
    }
}
