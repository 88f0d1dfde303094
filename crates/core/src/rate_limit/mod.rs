//! Rate Limiter
//!
//! Fixed-window counters keyed by caller-composed strings. State lives behind
//! the [`Counter`] capability; the default [`InMemoryCounter`] is
//! process-local, so every instance of a horizontally scaled deployment
//! enforces its own limit.

mod counter;
mod limiter;

pub use counter::*;
pub use limiter::*;

/// Compose a limiter key scoped to one operation, caller and tenant.
pub fn rate_limit_key(operation: &str, client_ip: &str, tenant: &str) -> String {
    format!("{operation}:{client_ip}:{tenant}")
}
