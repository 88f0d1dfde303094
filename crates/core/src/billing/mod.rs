//! Billing Entitlement
//!
//! Maps a tenant's stored billing fields to one of three paid plans and
//! answers what that plan lets the tenant do.

use jiff::Timestamp;

mod choices;
mod plans;
mod subscriptions;

pub use choices::*;
pub use plans::*;
pub use subscriptions::*;

/// Whether a trial ending at `trial_hasta` is still running at `now`.
pub fn is_trial_active(trial_hasta: Option<Timestamp>, now: Timestamp) -> bool {
    trial_hasta.is_some_and(|ends| ends > now)
}
