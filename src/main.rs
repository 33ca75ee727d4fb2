mod commands;
mod config;
mod eval;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::HandlerRegistry;
use crate::config::{Config, Platform};
use crate::platform::discord::DiscordGateway;
use crate::platform::telegram::TelegramGateway;
use crate::platform::Gateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hugot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("  Platform: {}", config.bot.platform);
    info!("  Prefix: {}", config.bot.prefix);

    let token = config.bot_token()?;

    // Handlers are fixed before the connection opens
    let mut registry = HandlerRegistry::new();
    commands::register_builtin(&mut registry, &config);
    if registry.is_empty() {
        anyhow::bail!("No command handlers registered");
    }
    info!("{} handler(s) registered", registry.len());
    let registry = Arc::new(registry);

    let mut gateway: Box<dyn Gateway> = match config.bot.platform {
        Platform::Discord => Box::new(DiscordGateway::new(token)),
        Platform::Telegram => Box::new(TelegramGateway::new(token)),
    };

    gateway
        .open(registry)
        .await
        .with_context(|| format!("Failed to open {} connection", config.bot.platform))?;

    info!("Bot is now running. Press CTRL-C to exit.");
    wait_for_shutdown().await?;

    gateway.close().await;
    info!("Bot stopped");

    Ok(())
}

/// Block until SIGINT or SIGTERM.
async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("Failed to register SIGTERM handler")?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for CTRL-C")?;
                info!("Received SIGINT, shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for CTRL-C")?;
        info!("Received SIGINT, shutting down...");
    }

    Ok(())
}
