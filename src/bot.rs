use chinabuyhub::activity::ROLE_TIERS;
use chinabuyhub::commands::{self, Command};
use chinabuyhub::hub::{Channel, Hub};
use chinabuyhub::posting::CycleOutcome;
use chinabuyhub::render::product_card;
use chinabuyhub::search;
use itertools::Itertools;
use serenity::async_trait;
use serenity::builder::EditRole;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Event handler holding the shared bot state.
pub struct Bot {
    pub hub: Arc<Hub>,
    pub guild_id: Option<GuildId>,
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !msg.content.starts_with(commands::PREFIX) {
            return;
        }

        self.handle_activity(&ctx, &msg).await;

        let Some(command) = commands::parse(&msg.content) else {
            return;
        };

        match command {
            Command::Search(term) => self.handle_search(&ctx, &msg, &term).await,
            Command::Category(category) => self.handle_category(&ctx, &msg, &category).await,
            Command::Ping => {
                let count = self.hub.catalog.len().await;
                let _ = msg
                    .reply(&ctx.http, format!("🏓 Pong! {} productos cargados.", count))
                    .await;
            }
            Command::Post => self.handle_post(&ctx, &msg).await,
            Command::Reload => self.handle_reload(&ctx, &msg).await,
            Command::Help => {
                if let Err(e) = msg.channel_id.say(&ctx.http, commands::help_text()).await {
                    error!("Error sending help: {:?}", e);
                }
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let guild_id = self.guild_id.or_else(|| ready.guilds.first().map(|g| g.id));
        match guild_id {
            Some(guild_id) => self.ensure_roles(&ctx, guild_id).await,
            None => warn!("Not a member of any guild, skipping role setup"),
        }
    }
}

impl Bot {
    /// Creates the activity tier roles that the guild does not have yet.
    async fn ensure_roles(&self, ctx: &Context, guild_id: GuildId) {
        let roles = match guild_id.roles(&ctx.http).await {
            Ok(roles) => roles,
            Err(e) => {
                error!("Error fetching roles for guild {}: {:?}", guild_id, e);
                return;
            }
        };

        for tier in ROLE_TIERS {
            if roles.values().any(|r| r.name == tier.name) {
                continue;
            }
            let colour = rand::random::<u32>() & 0xFF_FFFF;
            match guild_id
                .create_role(&ctx.http, EditRole::new().name(tier.name).colour(colour))
                .await
            {
                Ok(role) => info!("Created role {}", role.name),
                Err(e) => error!("Error creating role {}: {:?}", tier.name, e),
            }
        }
    }

    /// Counts the message and grants any tier role the member just reached.
    async fn handle_activity(&self, ctx: &Context, msg: &Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let tiers = self.hub.record_activity(msg.author.id).await;
        if tiers.is_empty() {
            return;
        }

        let roles = match guild_id.roles(&ctx.http).await {
            Ok(roles) => roles,
            Err(e) => {
                error!("Error fetching roles for guild {}: {:?}", guild_id, e);
                return;
            }
        };

        for tier in tiers {
            let Some(role) = roles.values().find(|r| r.name == tier.name) else {
                warn!("Role {} does not exist in guild {}", tier.name, guild_id);
                continue;
            };
            if let Err(e) = ctx
                .http
                .add_member_role(guild_id, msg.author.id, role.id, Some("Activity threshold reached"))
                .await
            {
                warn!("Could not give {} to {}: {:?}", tier.name, msg.author.name, e);
            } else {
                info!("Gave {} to {}", tier.name, msg.author.name);
            }
        }
    }

    /// Handles `!buscar <texto>`
    async fn handle_search(&self, ctx: &Context, msg: &Message, term: &str) {
        if term.is_empty() {
            let _ = msg.reply(&ctx.http, commands::search_usage()).await;
            return;
        }

        let products = self.hub.catalog.snapshot().await;
        let results = search::search(&products, term);
        if results.is_empty() {
            let _ = msg.reply(&ctx.http, commands::no_search_results(term)).await;
            return;
        }

        info!(
            "Search '{}' matched: {}",
            term,
            results.iter().map(|p| p.name.as_str()).join(", ")
        );
        for product in results {
            let card = product_card(product, false);
            if let Err(e) = msg.channel_id.send_message(&ctx.http, card.to_message()).await {
                error!("Error sending search result: {:?}", e);
            }
        }
    }

    /// Handles `!categoria <nombre>`
    async fn handle_category(&self, ctx: &Context, msg: &Message, category: &str) {
        if category.is_empty() {
            let _ = msg.reply(&ctx.http, commands::category_usage()).await;
            return;
        }

        let products = self.hub.catalog.snapshot().await;
        let results = search::by_category(&products, category);
        if results.is_empty() {
            let _ = msg.reply(&ctx.http, commands::no_category_results(category)).await;
            return;
        }

        for product in results {
            let card = product_card(product, false);
            if let Err(e) = msg.channel_id.send_message(&ctx.http, card.to_message()).await {
                error!("Error sending category result: {:?}", e);
            }
        }
    }

    /// Handles `!postear` by running one offers cycle right away.
    async fn handle_post(&self, ctx: &Context, msg: &Message) {
        let offers = self.hub.channel(&ctx.http, Channel::Offers);
        let reply = match self.hub.post_next_offer(&offers).await {
            Ok(CycleOutcome::Posted { name, .. }) => format!("✅ Publicado: **{}**", name),
            Ok(CycleOutcome::Skipped) => "⚠️ No hay productos cargados.".to_string(),
            Err(_) => "❌ No se pudo publicar la oferta.".to_string(),
        };
        let _ = msg.reply(&ctx.http, reply).await;
    }

    /// Handles `!recargar`
    async fn handle_reload(&self, ctx: &Context, msg: &Message) {
        let reply = match self.hub.catalog.reload().await {
            Ok(count) => format!("🔄 Catálogo recargado: {} productos.", count),
            Err(_) => "❌ Error leyendo el catálogo, se mantiene el anterior.".to_string(),
        };
        let _ = msg.reply(&ctx.http, reply).await;
    }
}
