//! Loyalty tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifetime points needed for [`Tier::Plata`].
pub const PLATA_THRESHOLD: u64 = 30;

/// Lifetime points needed for [`Tier::Oro`].
pub const ORO_THRESHOLD: u64 = 100;

/// Customer loyalty tier, derived from lifetime points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Fewer than 30 lifetime points.
    Bronce,

    /// 30 to 99 lifetime points.
    Plata,

    /// 100 or more lifetime points.
    Oro,
}

impl Tier {
    /// Stored tag for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronce => "bronce",
            Self::Plata => "plata",
            Self::Oro => "oro",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier for a lifetime points total. Lower bounds are inclusive.
///
/// There is no hysteresis: a corrected (lower) lifetime total moves the
/// customer back down.
#[must_use]
pub const fn calculate_tier(lifetime_points: u64) -> Tier {
    if lifetime_points >= ORO_THRESHOLD {
        Tier::Oro
    } else if lifetime_points >= PLATA_THRESHOLD {
        Tier::Plata
    } else {
        Tier::Bronce
    }
}
