//! Reward Config

use clap::Args;

/// Reward settings.
#[derive(Debug, Args)]
pub struct RewardConfig {
    /// Days a granted reward stays redeemable
    #[arg(long = "reward-expiration-days", env = "REWARD_EXPIRATION_DAYS", default_value_t = 30)]
    pub expiration_days: i32,
}
