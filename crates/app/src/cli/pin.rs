use clap::{Args, Subcommand};
use lealtad::pins::{hash_pin, verify_pin};

#[derive(Debug, Args)]
pub(crate) struct PinCommand {
    #[command(subcommand)]
    command: PinSubcommand,
}

#[derive(Debug, Subcommand)]
enum PinSubcommand {
    /// Hash a 4-digit PIN for storage
    Hash(HashPinArgs),

    /// Check a PIN against a stored hash or legacy plaintext PIN
    Verify(VerifyPinArgs),
}

#[derive(Debug, Args)]
struct HashPinArgs {
    /// The 4-digit PIN
    #[arg(long, env = "STAFF_PIN", hide_env_values = true)]
    pin: String,
}

#[derive(Debug, Args)]
struct VerifyPinArgs {
    /// The PIN to check
    #[arg(long)]
    pin: String,

    /// Stored `scrypt$salt$key` hash
    #[arg(long)]
    hash: Option<String>,

    /// Stored legacy plaintext PIN
    #[arg(long)]
    legacy: Option<String>,
}

pub(crate) async fn run(command: PinCommand) -> Result<(), String> {
    match command.command {
        PinSubcommand::Hash(args) => {
            let hash = tokio::task::spawn_blocking(move || hash_pin(&args.pin))
                .await
                .map_err(|error| format!("failed to hash pin: {error}"))?
                .map_err(|error| format!("failed to hash pin: {error}"))?;

            println!("pin_hash: {hash}");

            Ok(())
        }
        PinSubcommand::Verify(args) => {
            let valid = tokio::task::spawn_blocking(move || {
                verify_pin(&args.pin, args.hash.as_deref(), args.legacy.as_deref())
            })
            .await
            .map_err(|error| format!("failed to verify pin: {error}"))?;

            if !valid {
                return Err("pin does not match".to_string());
            }

            println!("pin matches");

            Ok(())
        }
    }
}
