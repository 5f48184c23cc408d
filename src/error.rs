use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch product source: {0}")]
    SourceFetch(String),

    #[error("Failed to sign service account token: {0}")]
    Auth(#[from] jsonwebtoken::errors::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist cursor to {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to deliver message: {0}")]
    Delivery(Box<serenity::Error>),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Error::Delivery(Box::new(value))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
