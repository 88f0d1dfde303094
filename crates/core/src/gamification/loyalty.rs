//! Customer loyalty state.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gamification::{StreakOutcome, Tier, calculate_tier, process_streak};

/// Points balance and streak for one customer of one tenant.
///
/// The tier is never stored; it is recomputed from the lifetime counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLoyalty {
    /// Spendable balance.
    pub puntos_actuales: u64,

    /// Lifetime points earned; never decreases through visits or redemptions.
    pub total_puntos_historicos: u64,

    /// Consecutive on-cadence weekly visits.
    pub current_streak: u32,
}

/// What a visit changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    /// Points credited by this visit.
    pub points_awarded: u64,

    /// Tier before the visit.
    pub previous_tier: Tier,

    /// Tier after the visit.
    pub tier: Tier,

    /// Streak decision for the visit.
    pub streak: StreakOutcome,
}

impl VisitOutcome {
    /// Whether the visit moved the customer to another tier.
    pub fn tier_changed(&self) -> bool {
        self.previous_tier != self.tier
    }
}

/// Redemption cost exceeds the current balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient points")]
pub struct InsufficientPoints {
    /// Current balance.
    pub available: u64,

    /// Points the redemption needs.
    pub required: u64,
}

impl CustomerLoyalty {
    /// Current tier, derived from lifetime points.
    pub const fn tier(&self) -> Tier {
        calculate_tier(self.total_puntos_historicos)
    }

    /// Credit `points` for a visit at `now` and advance the streak.
    pub fn record_visit(
        &mut self,
        points: u64,
        last_visit: Option<Timestamp>,
        now: Timestamp,
    ) -> VisitOutcome {
        let previous_tier = self.tier();

        self.puntos_actuales = self.puntos_actuales.saturating_add(points);
        self.total_puntos_historicos = self.total_puntos_historicos.saturating_add(points);

        let streak = process_streak(last_visit, self.current_streak, now);

        self.current_streak = streak.new_streak;

        VisitOutcome {
            points_awarded: points,
            previous_tier,
            tier: self.tier(),
            streak,
        }
    }

    /// Debit `cost` from the balance. The lifetime counter is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientPoints`] when the balance is lower than `cost`.
    pub fn redeem(&mut self, cost: u64) -> Result<u64, InsufficientPoints> {
        let remaining = self
            .puntos_actuales
            .checked_sub(cost)
            .ok_or(InsufficientPoints {
                available: self.puntos_actuales,
                required: cost,
            })?;

        self.puntos_actuales = remaining;

        Ok(remaining)
    }
}
