use crate::activity::{ActivityTracker, RoleTier};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::cursor::PostingCursor;
use crate::error::Result;
use crate::posting::{post_batch, run_cycle, CycleOutcome, CycleStyle, DiscordChannel, ProductSink};
use crate::render::{DAILY_HEADLINE, OFFER_HEADLINE};
use rand::seq::IndexedRandom;
use serenity::http::Http;
use serenity::model::id::UserId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

const MOTIVATION: [&str; 4] = [
    "🧠 Comprar inteligente > comprar impulsivo.",
    "💡 Buena réplica = buena información.",
    "🛡️ Seguridad primero siempre.",
    "🎯 No es comprar más, es comprar mejor.",
];

const NEWS: [&str; 3] = [
    "📢 Tip: revisa siempre bien las fotos QC.",
    "📢 Info: guarda capturas de tus chats con agentes.",
    "📢 Consejo: empieza con algo pequeño en tu primer pedido.",
];

/// Channels the bot posts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Catalog,
    Top,
    Offers,
    Chat,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelIds {
    pub catalog: u64,
    pub top: u64,
    pub offers: u64,
    pub chat: u64,
}

impl ChannelIds {
    pub fn get(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Catalog => self.catalog,
            Channel::Top => self.top,
            Channel::Offers => self.offers,
            Channel::Chat => self.chat,
        }
    }
}

/// How many products the first run posts.
#[derive(Debug, Clone, Copy)]
pub struct SeedSizes {
    pub catalog: usize,
    pub top: usize,
}

/// Process-wide bot state: the catalog, both cursors and member activity.
pub struct Hub {
    pub catalog: Catalog,
    offers_cursor: Mutex<PostingCursor>,
    daily_cursor: Mutex<PostingCursor>,
    activity: Mutex<ActivityTracker>,
    seed_done: AtomicBool,
    seed_sizes: SeedSizes,
    channels: ChannelIds,
}

impl Hub {
    pub fn new(
        catalog: Catalog,
        offers_cursor: PostingCursor,
        daily_cursor: PostingCursor,
        channels: ChannelIds,
        seed_sizes: SeedSizes,
    ) -> Self {
        Hub {
            catalog,
            offers_cursor: Mutex::new(offers_cursor),
            daily_cursor: Mutex::new(daily_cursor),
            activity: Mutex::new(ActivityTracker::new()),
            seed_done: AtomicBool::new(false),
            seed_sizes,
            channels,
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        let catalog = Catalog::new(client, config.source()?);
        Ok(Hub::new(
            catalog,
            PostingCursor::load(&config.state_path),
            PostingCursor::load(&config.daily_state_path),
            ChannelIds {
                catalog: config.catalog_channel_id,
                top: config.top_channel_id,
                offers: config.offers_channel_id,
                chat: config.chat_channel_id,
            },
            SeedSizes {
                catalog: config.initial_catalog_count,
                top: config.initial_top_count,
            },
        ))
    }

    pub fn channel(&self, http: &Arc<Http>, channel: Channel) -> DiscordChannel {
        DiscordChannel::new(Arc::clone(http), self.channels.get(channel))
    }

    /// Posts the next offer and advances the offers cursor.
    pub async fn post_next_offer(&self, sink: &dyn ProductSink) -> Result<CycleOutcome> {
        let products = self.catalog.snapshot().await;
        let mut cursor = self.offers_cursor.lock().await;
        let style = CycleStyle {
            headline: Some(OFFER_HEADLINE),
            emphasize: true,
        };
        run_cycle(&products, &mut cursor, sink, style).await
    }

    /// Posts the product of the day and advances the daily cursor.
    pub async fn post_daily_highlight(&self, sink: &dyn ProductSink) -> Result<CycleOutcome> {
        let products = self.catalog.snapshot().await;
        let mut cursor = self.daily_cursor.lock().await;
        let style = CycleStyle {
            headline: Some(DAILY_HEADLINE),
            emphasize: true,
        };
        run_cycle(&products, &mut cursor, sink, style).await
    }

    pub fn is_seeded(&self) -> bool {
        self.seed_done.load(Ordering::SeqCst)
    }

    /// Posts the first products to the top and catalog channels, once per process.
    /// Returns `None` when already seeded or nothing is loaded yet.
    pub async fn seed(&self, top: &dyn ProductSink, catalog: &dyn ProductSink) -> Option<(usize, usize)> {
        let products = self.catalog.snapshot().await;
        if products.is_empty() {
            return None;
        }
        if self.seed_done.swap(true, Ordering::SeqCst) {
            return None;
        }

        info!("Starting initial seed...");
        let top_count = self.seed_sizes.top.min(products.len());
        let catalog_count = self.seed_sizes.catalog.min(products.len());
        let top_sent = post_batch(&products[..top_count], top, true).await;
        let catalog_sent = post_batch(&products[..catalog_count], catalog, false).await;
        info!("Seed completed: {} top, {} catalog", top_sent, catalog_sent);
        Some((top_sent, catalog_sent))
    }

    pub async fn send_motivation(&self, sink: &dyn ProductSink) -> Result<()> {
        let line = MOTIVATION.choose(&mut rand::rng()).copied().unwrap_or(MOTIVATION[0]);
        sink.send_text(line).await
    }

    pub async fn send_news(&self, sink: &dyn ProductSink) -> Result<()> {
        let line = NEWS.choose(&mut rand::rng()).copied().unwrap_or(NEWS[0]);
        sink.send_text(line).await
    }

    /// Counts a member message and returns the role tiers it unlocked.
    pub async fn record_activity(&self, user: UserId) -> Vec<RoleTier> {
        self.activity.lock().await.record(user)
    }

    pub async fn offers_index(&self) -> usize {
        self.offers_cursor.lock().await.index()
    }
}
