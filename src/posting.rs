use crate::catalog::ProductRecord;
use crate::cursor::PostingCursor;
use crate::error::Result;
use crate::render::{product_card, ProductCard};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Somewhere a product card can be delivered.
#[async_trait]
pub trait ProductSink: Send + Sync {
    async fn send_card(&self, card: &ProductCard) -> Result<()>;

    async fn send_text(&self, text: &str) -> Result<()>;
}

/// A Discord text channel.
pub struct DiscordChannel {
    pub http: Arc<Http>,
    pub channel_id: ChannelId,
}

impl DiscordChannel {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        DiscordChannel {
            http,
            channel_id: ChannelId::new(channel_id),
        }
    }
}

#[async_trait]
impl ProductSink for DiscordChannel {
    async fn send_card(&self, card: &ProductCard) -> Result<()> {
        self.channel_id.send_message(&self.http, card.to_message()).await?;
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.channel_id.say(&self.http, text).await?;
        Ok(())
    }
}

/// How a posting cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing loaded, cursor untouched.
    Skipped,
    /// `index` was posted. `durable` is false when the cursor write failed.
    Posted {
        index: usize,
        name: String,
        durable: bool,
    },
}

/// Options for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleStyle<'a> {
    pub headline: Option<&'a str>,
    pub emphasize: bool,
}

/// Selects the next product, sends it and advances the cursor.
///
/// A delivery error is returned without advancing, so the same product is
/// picked again on the next tick.
pub async fn run_cycle(
    products: &[ProductRecord],
    cursor: &mut PostingCursor,
    sink: &dyn ProductSink,
    style: CycleStyle<'_>,
) -> Result<CycleOutcome> {
    let Some(index) = cursor.next(products.len()) else {
        return Ok(CycleOutcome::Skipped);
    };
    let product = &products[index];

    let mut card = product_card(product, style.emphasize);
    if let Some(headline) = style.headline {
        card = card.with_headline(headline);
    }

    if let Err(e) = sink.send_card(&card).await {
        error!("Failed to post product {} ({}): {:?}", index, product.name, e);
        return Err(e);
    }

    let durable = match cursor.advance() {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Cursor {:?} advanced in memory only, a restart may repost: {:?}",
                cursor.path(),
                e
            );
            false
        }
    };

    info!("Posted product {} ({})", index, product.name);
    Ok(CycleOutcome::Posted {
        index,
        name: product.name.clone(),
        durable,
    })
}

/// Sends `products` in order. Failed sends are logged and skipped.
/// Returns how many were delivered.
pub async fn post_batch(products: &[ProductRecord], sink: &dyn ProductSink, emphasize: bool) -> usize {
    let mut sent = 0;
    for product in products {
        match sink.send_card(&product_card(product, emphasize)).await {
            Ok(()) => sent += 1,
            Err(e) => error!("Skipping product {} in batch: {:?}", product.name, e),
        }
    }
    sent
}
