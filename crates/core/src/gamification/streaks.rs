//! Weekly visit streaks.

use jiff::{SignedDuration, Timestamp};

/// Gaps shorter than this many days fall in the same weekly window.
pub const STREAK_MIN_GAP_DAYS: i64 = 7;

/// Gaps longer than this many days break the streak.
pub const STREAK_MAX_GAP_DAYS: i64 = 14;

const SECONDS_PER_DAY: i64 = 86_400;

/// Result of applying a visit to a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    /// Streak after the visit.
    pub new_streak: u32,

    /// Whether the visit changed the stored streak.
    pub streak_updated: bool,
}

impl StreakOutcome {
    const fn restart() -> Self {
        Self {
            new_streak: 1,
            streak_updated: true,
        }
    }
}

/// Apply a visit at `now` to a streak whose last visit was `last_visit`.
///
/// * no previous visit: the streak starts at 1
/// * fewer than 7 days since the last visit: same weekly window, unchanged
/// * 7 to 14 days: on cadence, the streak grows by one
/// * more than 14 days: cadence broken, the streak restarts at 1
///
/// Pass a precise instant; date-only values shift the day count at the
/// boundaries.
pub fn process_streak(
    last_visit: Option<Timestamp>,
    current_streak: u32,
    now: Timestamp,
) -> StreakOutcome {
    let Some(last_visit) = last_visit else {
        return StreakOutcome::restart();
    };

    match elapsed_days(last_visit, now) {
        gap if gap < STREAK_MIN_GAP_DAYS => StreakOutcome {
            new_streak: current_streak,
            streak_updated: false,
        },
        gap if gap <= STREAK_MAX_GAP_DAYS => StreakOutcome {
            new_streak: current_streak.saturating_add(1),
            streak_updated: true,
        },
        _ => StreakOutcome::restart(),
    }
}

/// Whole days between two instants, rounded up. Negative spans count as zero.
pub fn elapsed_days(from: Timestamp, to: Timestamp) -> i64 {
    let elapsed = to.duration_since(from);

    if elapsed <= SignedDuration::ZERO {
        return 0;
    }

    let seconds = elapsed.as_secs();
    let partial = seconds % SECONDS_PER_DAY != 0 || elapsed.subsec_nanos() != 0;

    seconds / SECONDS_PER_DAY + i64::from(partial)
}
