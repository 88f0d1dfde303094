use clap::{Args, Subcommand};
use jiff::Timestamp;
use lealtad::tokens::{AdminAllowlist, AdminTokenAuthority, SigningKey};

#[derive(Debug, Args)]
pub(crate) struct AdminTokenCommand {
    #[command(subcommand)]
    command: AdminTokenSubcommand,
}

#[derive(Debug, Subcommand)]
enum AdminTokenSubcommand {
    /// Issue a session token for an operator
    Issue(IssueArgs),

    /// Verify a session token
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
struct AuthorityArgs {
    /// Secret used to sign admin session tokens
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: String,

    /// Comma-separated admin emails
    #[arg(long, env = "ADMIN_EMAILS", default_value = "")]
    admin_emails: String,
}

#[derive(Debug, Args)]
struct IssueArgs {
    #[command(flatten)]
    authority: AuthorityArgs,

    /// Operator email
    #[arg(long)]
    email: String,
}

#[derive(Debug, Args)]
struct VerifyArgs {
    #[command(flatten)]
    authority: AuthorityArgs,

    /// Token to verify
    #[arg(long)]
    token: String,
}

pub(crate) fn run(command: AdminTokenCommand) -> Result<(), String> {
    match command.command {
        AdminTokenSubcommand::Issue(args) => {
            let issued = authority(&args.authority)?
                .issue(&args.email, Timestamp::now())
                .map_err(|error| format!("failed to issue token: {error}"))?;

            println!("email: {}", issued.session.email);
            println!("expires_at: {}", issued.session.expires_at);
            println!("token: {}", issued.token);

            Ok(())
        }
        AdminTokenSubcommand::Verify(args) => {
            let session = authority(&args.authority)?
                .verify(&args.token, Timestamp::now())
                .ok_or_else(|| "token is invalid or expired".to_string())?;

            println!("email: {}", session.email);
            println!("issued_at: {}", session.issued_at);
            println!("expires_at: {}", session.expires_at);

            Ok(())
        }
    }
}

fn authority(args: &AuthorityArgs) -> Result<AdminTokenAuthority, String> {
    let key = SigningKey::new(args.session_secret.as_bytes())
        .map_err(|error| format!("invalid session secret: {error}"))?;

    Ok(AdminTokenAuthority::new(
        key,
        AdminAllowlist::from_csv(&args.admin_emails),
    ))
}
