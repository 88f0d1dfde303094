use clap::Args;
use jiff::Timestamp;
use lealtad::gamification::{calculate_tier, process_streak};

#[derive(Debug, Args)]
pub(crate) struct TierArgs {
    /// Lifetime points earned by the customer
    #[arg(long)]
    lifetime_points: u64,

    /// Last visit (RFC 3339); omit for a first visit
    #[arg(long)]
    last_visit: Option<Timestamp>,

    /// Current weekly streak
    #[arg(long, default_value_t = 0)]
    streak: u32,
}

pub(crate) fn run(args: &TierArgs) -> Result<(), String> {
    let tier = calculate_tier(args.lifetime_points);
    let streak = process_streak(args.last_visit, args.streak, Timestamp::now());

    println!("tier: {tier}");
    println!("streak: {}", streak.new_streak);
    println!("streak_updated: {}", streak.streak_updated);

    Ok(())
}
