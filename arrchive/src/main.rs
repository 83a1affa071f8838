//! Arrchive - Main entry point
//!
//! Runs one synchronization pass and exits.

use anyhow::{Context, Result};
use arrchive::drive::{Authenticator, GoogleDrive};
use arrchive::notify::{DiscordWebhook, Notifier};
use arrchive::{config::Config, run, shutdown, utils};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a dotenv file (defaults to ./.env when present)
    #[arg(short, long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overrides LOG_LEVEL
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env(args.env_file.as_deref());

    // Initialize logging
    let log_level = args
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    utils::logger::init(&log_level)?;

    let config = config.context("Invalid configuration")?;

    tracing::info!("Arrchive v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "Loaded configuration");

    tokio::select! {
        result = start(config) => result,
        _ = shutdown::wait_for_signal() => Ok(()),
    }
}

async fn start(config: Config) -> Result<()> {
    let Some(account) = config.drive.service_account.clone() else {
        tracing::error!(
            "Failed to authenticate with Google Drive: service account credentials are not configured"
        );
        anyhow::bail!("missing Google service account credentials");
    };

    let drive = GoogleDrive::new(Authenticator::new(account));
    if let Err(e) = drive.authenticate().await {
        tracing::error!("Failed to authenticate with Google Drive: {}", e);
        return Err(e).context("Google Drive authentication failed");
    }
    tracing::info!("Authenticated with Google Drive");

    let notifier = config
        .discord_webhook_url
        .as_ref()
        .map(|url| Notifier::new(DiscordWebhook::new(url.as_str())));

    run::run(&config, &drive, notifier.as_ref()).await;

    Ok(())
}
