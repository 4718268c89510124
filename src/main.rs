mod bot;
mod config;
mod platform;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::platform::telegram::TelegramSender;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,echobot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // An explicit config file is optional; the environment always wins.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::from_env().context("Failed to load config from environment")?,
    };

    info!("URL: {}", config.server.public_url);
    info!("  Port: {}", config.server.port);
    info!("  Telegram API: {}", config.telegram.api_url);

    // Credentials are checked once; a bad token leaves the bot degraded, not dead.
    let sender = TelegramSender::connect(&config.telegram).await;
    if !sender.is_available() {
        warn!("Running without a working bot, replies will not be delivered");
    }

    let state = AppState::new(config, Arc::new(sender));
    server::serve(state).await?;

    Ok(())
}
