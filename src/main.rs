mod bot;
mod commands;
mod config;
mod fetch;
mod handler;
mod platform;
mod reply;
mod router;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppContext;
use crate::config::{Config, PlatformKind};
use crate::platform::console::{ConsoleSink, ConsoleSource};
use crate::platform::telegram::{self, TelegramSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may live in a local .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quipbot=debug".into()),
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

    info!("Configuration loaded successfully");
    info!("  Platform: {}", config.platform.kind);
    info!("  Command prefix: {}", config.command_prefix());
    info!("  Handler timeout: {}s", config.bot.handler_timeout_secs);
    if !config.has_completion_key() {
        warn!("No OpenAI key configured, /prompt will answer with a failure");
    }

    let kind = config.platform.kind;
    let token = config.telegram.bot_token.clone();

    let ctx = Arc::new(AppContext::new(config)?);
    ctx.prime_categories().await;

    info!("Bot is starting...");
    match kind {
        PlatformKind::Telegram => {
            let client = Bot::new(token);
            let username = telegram::bot_username(&client).await?;
            info!("Authorized as @{}", username.as_deref().unwrap_or("unknown"));

            let router = Arc::new(commands::build_router(&ctx, username)?);
            let source = telegram::start(client.clone());
            bot::run(source, Arc::new(TelegramSink::new(client)), ctx, router).await?;
        }
        PlatformKind::Console => {
            let router = Arc::new(commands::build_router(&ctx, None)?);
            bot::run(ConsoleSource::stdin(), Arc::new(ConsoleSink), ctx, router).await?;
        }
    }

    info!("Bot stopped");
    Ok(())
}
