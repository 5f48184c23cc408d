mod bot;
#[path = "../cron/scheduler.rs"]
mod scheduler;

use anyhow::Context as _;
use bot::Bot;
use chinabuyhub::config::Config;
use chinabuyhub::hub::Hub;
use scheduler::start_scheduler;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// **Main function that initializes the bot**
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let hub = Arc::new(Hub::from_config(&config, reqwest::Client::new())?);

    // A failed first load is not fatal, the reload job keeps trying
    if let Err(e) = hub.catalog.reload().await {
        warn!("Starting with an empty catalog: {}", e);
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let bot = Bot {
        hub: Arc::clone(&hub),
        guild_id: config.guild_id.map(GuildId::new),
    };

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(bot)
        .await
        .context("Error creating client")?;

    let _scheduler = start_scheduler(Arc::clone(&hub), Arc::clone(&client.http), config.intervals())
        .await
        .context("Failed to start scheduler")?;
    info!("Scheduled jobs started");

    client.start().await.context("Client error")?;

    Ok(())
}
