//! Gamification
//!
//! Pure functions deriving a customer's loyalty tier and weekly visit streak.
//! Nothing here fails; unusual input resolves to the base tier or a streak
//! restart.

mod loyalty;
mod streaks;
mod tiers;

pub use loyalty::*;
pub use streaks::*;
pub use tiers::*;
