//! Windowed counters.

use std::{
    fmt,
    sync::Mutex,
    time::{Duration, Instant},
};

use rustc_hash::FxHashMap;

/// Stored key count at which `increment` sweeps expired windows first.
pub const PRUNE_THRESHOLD: usize = 1024;

/// Count and window end for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterState {
    /// Hits recorded in the current window.
    pub count: u32,

    /// Instant the current window closes.
    pub reset_at: Instant,
}

impl CounterState {
    /// Whether the window has closed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Increment-with-expiry storage behind the rate limiter.
///
/// Implementations backed by a shared store make limits global across
/// instances without touching call sites.
pub trait Counter: fmt::Debug + Send + Sync {
    /// Live state for `key`, or `None` if absent or expired.
    fn get(&self, key: &str, now: Instant) -> Option<CounterState>;

    /// Record a hit. An absent or expired key starts a new window of
    /// `window` with a count of one.
    fn increment(&self, key: &str, window: Duration, now: Instant) -> CounterState;

    /// Forget `key`.
    fn reset(&self, key: &str);

    /// Drop every expired key.
    fn purge_expired(&self, now: Instant);
}

/// Process-local counter map.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    buckets: Mutex<FxHashMap<String, CounterState>>,
}

impl InMemoryCounter {
    /// Empty counter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, expired or not.
    pub fn len(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Counter for InMemoryCounter {
    fn get(&self, key: &str, now: Instant) -> Option<CounterState> {
        let buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        buckets
            .get(key)
            .copied()
            .filter(|state| !state.is_expired(now))
    }

    fn increment(&self, key: &str, window: Duration, now: Instant) -> CounterState {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        if buckets.len() >= PRUNE_THRESHOLD {
            buckets.retain(|_key, state| !state.is_expired(now));
        }

        let fresh = CounterState {
            count: 1,
            reset_at: now + window,
        };

        let state = buckets
            .entry(key.to_string())
            .and_modify(|state| {
                if state.is_expired(now) {
                    *state = fresh;
                } else {
                    state.count = state.count.saturating_add(1);
                }
            })
            .or_insert(fresh);

        *state
    }

    fn reset(&self, key: &str) {
        self.buckets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    fn purge_expired(&self, now: Instant) {
        self.buckets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, state| !state.is_expired(now));
    }
}
