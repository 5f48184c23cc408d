// shared test fixtures
#![allow(dead_code)]

use chinabuyhub::catalog::ProductRecord;
use chinabuyhub::error::{Error, Result};
use chinabuyhub::posting::ProductSink;
use chinabuyhub::render::ProductCard;
use once_cell::sync::Lazy;
use serenity::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub static PRODUCTS_CSV: Lazy<String> =
    Lazy::new(|| include_str!("fixtures/products.csv").to_string());

pub static TEST_PRIVATE_KEY: Lazy<String> =
    Lazy::new(|| include_str!("fixtures/test_service_account_key.pem").to_string());

/// Service account key file pointing its token exchange at `token_uri`.
pub fn service_account_json(token_uri: &str) -> String {
    serde_json::json!({
        "type": "service_account",
        "client_email": "catalog-bot@chinabuyhub.iam.gserviceaccount.com",
        "private_key": *TEST_PRIVATE_KEY,
        "token_uri": token_uri,
    })
    .to_string()
}

pub fn products(count: usize) -> Vec<ProductRecord> {
    (0..count)
        .map(|i| ProductRecord {
            photo_url: format!("https://img.example/{}.png", i),
            name: format!("Producto {}", i),
            price: format!("{}€", 10 + i),
            ..Default::default()
        })
        .collect()
}

/// Records everything sent to it. Fails the next `failures` sends first.
#[derive(Default)]
pub struct RecordingSink {
    pub cards: Mutex<Vec<ProductCard>>,
    pub texts: Mutex<Vec<String>>,
    failures: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: usize) -> Self {
        RecordingSink {
            failures: AtomicUsize::new(failures),
            ..Default::default()
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.cards.lock().unwrap().iter().map(|c| c.title.clone()).collect()
    }

    fn should_fail(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ProductSink for RecordingSink {
    async fn send_card(&self, card: &ProductCard) -> Result<()> {
        if self.should_fail() {
            return Err(Error::from(serenity::Error::Other("channel unavailable")));
        }
        self.cards.lock().unwrap().push(card.clone());
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        if self.should_fail() {
            return Err(Error::from(serenity::Error::Other("channel unavailable")));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
