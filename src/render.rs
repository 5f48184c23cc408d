use crate::catalog::ProductRecord;
use serenity::builder::{CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateMessage};

const EMBED_COLOUR: u32 = 0x111827;
const FOOTER: &str = "Recomendación basada en catálogo curado y estándares de la comunidad.";

pub const OFFER_HEADLINE: &str = "💸 **OFERTA PREMIUM**";
pub const DAILY_HEADLINE: &str = "📆 **Producto destacado del día**";

/// A link button under the product embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: &'static str,
    pub url: String,
}

/// Everything shown for one product, independent of the chat library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub headline: Option<String>,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub buttons: Vec<LinkButton>,
}

/// Lays out a product. `emphasize` marks top picks and offers.
pub fn product_card(product: &ProductRecord, emphasize: bool) -> ProductCard {
    let title = if emphasize {
        format!("💎 {}", product.name)
    } else {
        format!("🛍️ {}", product.name)
    };

    let mut description = String::new();
    if !product.category.is_empty() {
        description.push_str(&format!("🏷️ **{}**\n", product.category.to_uppercase()));
    }
    if !product.price.is_empty() {
        description.push_str(&format!("💰 **{}**", product.price));
    }

    let buttons = [
        ("USFANS (recomendado)", &product.links.usfans),
        ("CNFANS", &product.links.cnfans),
        ("Kakobuy", &product.links.kakobuy),
    ]
    .into_iter()
    .filter(|(_, url)| url.starts_with("http"))
    .map(|(label, url)| LinkButton {
        label,
        url: url.clone(),
    })
    .collect();

    ProductCard {
        headline: None,
        title,
        description,
        image_url: product.photo_url.clone(),
        buttons,
    }
}

impl ProductCard {
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }

    pub fn to_message(&self) -> CreateMessage {
        let mut embed = CreateEmbed::new()
            .colour(EMBED_COLOUR)
            .title(&self.title)
            .image(&self.image_url)
            .footer(CreateEmbedFooter::new(FOOTER));
        if !self.description.is_empty() {
            embed = embed.description(&self.description);
        }

        let mut message = CreateMessage::new().embed(embed);
        if let Some(headline) = &self.headline {
            message = message.content(headline);
        }
        if !self.buttons.is_empty() {
            let buttons = self
                .buttons
                .iter()
                .map(|b| CreateButton::new_link(&b.url).label(b.label))
                .collect();
            message = message.components(vec![CreateActionRow::Buttons(buttons)]);
        }
        message
    }
}
