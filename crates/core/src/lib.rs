//! Lealtad
//!
//! Lealtad is the entitlement and loyalty computation engine behind a
//! multi-tenant loyalty platform: program configuration, tiers and streaks,
//! billing limits, and the tokens, PIN hashes and rate limits that guard
//! tenant-scoped operations.

pub mod billing;
pub mod gamification;
pub mod motors;
pub mod pins;
pub mod prelude;
pub mod programs;
pub mod rate_limit;
pub mod tokens;
