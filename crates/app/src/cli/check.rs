use clap::Args;
use lealtad_app::{config::EngineConfig, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: EngineConfig,
}

pub(crate) fn run(args: &CheckArgs) -> Result<(), String> {
    let config = &args.config;

    AppContext::from_config(config)
        .map_err(|error| format!("failed to build services: {error}"))?;

    let allowlist = if config.session.allowlist().is_explicit() {
        "explicit"
    } else {
        "default domain"
    };

    println!("store_url: {}", config.store.url);
    println!("admin_allowlist: {allowlist}");
    println!("session_cookie: {}", config.session.cookie_name);
    println!("session_ttl_hours: {}", config.session.ttl_hours);
    println!("sso_enabled: {}", !config.sso.shared_secret.is_empty());
    println!("sso_token_ttl_seconds: {}", config.sso.token_ttl_seconds);
    println!("reward_expiration_days: {}", config.rewards.expiration_days);
    println!("submission_limit: {}", config.limits.submission_limit);
    println!("configuration ok");

    Ok(())
}
