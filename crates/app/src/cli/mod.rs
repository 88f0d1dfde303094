use clap::{Parser, Subcommand};
use lealtad_app::config::logging::LoggingConfig;

mod admin_token;
mod check;
mod pin;
mod plans;
mod tier;

#[derive(Debug, Parser)]
#[command(name = "lealtad", about = "Lealtad operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hash or check staff PINs
    Pin(pin::PinCommand),

    /// Print the plan catalog
    Plans(plans::PlansArgs),

    /// Issue or verify admin session tokens
    AdminToken(admin_token::AdminTokenCommand),

    /// Loyalty tier and streak for a customer
    Tier(tier::TierArgs),

    /// Validate engine configuration and wire every service
    Check(check::CheckArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Pin(command) => pin::run(command).await,
            Commands::Plans(args) => plans::run(&args),
            Commands::AdminToken(command) => admin_token::run(command),
            Commands::Tier(args) => tier::run(&args),
            Commands::Check(args) => check::run(&args),
        }
    }
}
