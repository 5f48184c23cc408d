use crate::error::{Error, Result};
use crate::source::Source;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Bot configuration, read from the process environment (and `.env` if present).
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub discord_token: String,

    #[serde(default)]
    pub sheet_csv_url: Option<String>,
    #[serde(default = "default_true")]
    pub csv_has_header: bool,

    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,
    /// Service account key file contents, as downloaded from Google Cloud.
    #[serde(default)]
    pub google_service_account: Option<String>,

    #[serde(default)]
    pub guild_id: Option<u64>,
    pub catalog_channel_id: u64,
    pub top_channel_id: u64,
    pub offers_channel_id: u64,
    pub chat_channel_id: u64,

    #[serde(default = "default_reload_interval")]
    pub reload_interval_secs: u64,
    #[serde(default = "default_offer_interval")]
    pub offer_interval_secs: u64,
    #[serde(default = "default_daily_interval")]
    pub daily_interval_secs: u64,
    #[serde(default = "default_motivation_interval")]
    pub motivation_interval_secs: u64,
    #[serde(default = "default_news_interval")]
    pub news_interval_secs: u64,
    #[serde(default = "default_seed_interval")]
    pub seed_interval_secs: u64,

    #[serde(default = "default_initial_catalog_count")]
    pub initial_catalog_count: usize,
    #[serde(default = "default_initial_top_count")]
    pub initial_top_count: usize,

    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_daily_state_path")]
    pub daily_state_path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_sheet_range() -> String {
    "Sheet1!A:H".into()
}

fn default_reload_interval() -> u64 {
    3 * 60 * 60
}

fn default_offer_interval() -> u64 {
    2 * 60 * 60
}

fn default_daily_interval() -> u64 {
    24 * 60 * 60
}

fn default_motivation_interval() -> u64 {
    6 * 60 * 60
}

fn default_news_interval() -> u64 {
    12 * 60 * 60
}

fn default_seed_interval() -> u64 {
    30
}

fn default_initial_catalog_count() -> usize {
    50
}

fn default_initial_top_count() -> usize {
    5
}

fn default_state_path() -> PathBuf {
    "state.json".into()
}

fn default_daily_state_path() -> PathBuf {
    "daily_state.json".into()
}

/// Fixed periods for every scheduled job.
#[derive(Debug, Clone, Copy)]
pub struct Intervals {
    pub reload: Duration,
    pub offer: Duration,
    pub daily: Duration,
    pub motivation: Duration,
    pub news: Duration,
    pub seed: Duration,
}

impl Config {
    /// Loads `.env` (if any) and deserializes the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds a config from explicit key/value pairs, using the same names as the environment.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::from_iter(vars)
            .map_err(|e| Error::Config(format!("Failed to read configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discord_token.trim().is_empty() {
            return Err(Error::Config("'DISCORD_TOKEN' is empty".into()));
        }
        let intervals = [
            ("RELOAD_INTERVAL_SECS", self.reload_interval_secs),
            ("OFFER_INTERVAL_SECS", self.offer_interval_secs),
            ("DAILY_INTERVAL_SECS", self.daily_interval_secs),
            ("MOTIVATION_INTERVAL_SECS", self.motivation_interval_secs),
            ("NEWS_INTERVAL_SECS", self.news_interval_secs),
            ("SEED_INTERVAL_SECS", self.seed_interval_secs),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, secs)| *secs == 0) {
            return Err(Error::Config(format!("'{}' must be greater than zero", name)));
        }
        self.source().map(|_| ())
    }

    /// Resolves which tabular source the catalog is loaded from.
    /// A CSV URL wins over a spreadsheet id when both are set.
    pub fn source(&self) -> Result<Source> {
        if let Some(url) = self.sheet_csv_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(Source::Csv {
                url: url.trim().to_string(),
                has_header: self.csv_has_header,
            });
        }

        match (&self.spreadsheet_id, &self.google_service_account) {
            (Some(id), Some(credentials)) => Ok(Source::Sheets {
                spreadsheet_id: id.clone(),
                range: self.sheet_range.clone(),
                credentials_json: credentials.clone(),
            }),
            (Some(_), None) => Err(Error::Config(
                "'SPREADSHEET_ID' requires 'GOOGLE_SERVICE_ACCOUNT'".into(),
            )),
            _ => Err(Error::Config(
                "Either 'SHEET_CSV_URL' or 'SPREADSHEET_ID' must be set".into(),
            )),
        }
    }

    pub fn intervals(&self) -> Intervals {
        Intervals {
            reload: Duration::from_secs(self.reload_interval_secs),
            offer: Duration::from_secs(self.offer_interval_secs),
            daily: Duration::from_secs(self.daily_interval_secs),
            motivation: Duration::from_secs(self.motivation_interval_secs),
            news: Duration::from_secs(self.news_interval_secs),
            seed: Duration::from_secs(self.seed_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut base = vec![
            ("DISCORD_TOKEN", "token"),
            ("CATALOG_CHANNEL_ID", "1"),
            ("TOP_CHANNEL_ID", "2"),
            ("OFFERS_CHANNEL_ID", "3"),
            ("CHAT_CHANNEL_ID", "4"),
        ];
        base.extend_from_slice(extra);
        base.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn csv_source_with_defaults() {
        let config = Config::from_vars(vars(&[("SHEET_CSV_URL", "https://example.com/pub?output=csv")])).unwrap();

        assert_eq!(config.offer_interval_secs, 7200);
        assert_eq!(config.initial_catalog_count, 50);
        assert_eq!(config.initial_top_count, 5);
        assert_eq!(config.state_path, PathBuf::from("state.json"));
        match config.source().unwrap() {
            Source::Csv { url, has_header } => {
                assert_eq!(url, "https://example.com/pub?output=csv");
                assert!(has_header);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn sheets_source_needs_credentials() {
        let err = Config::from_vars(vars(&[("SPREADSHEET_ID", "abc")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = Config::from_vars(vars(&[
            ("SPREADSHEET_ID", "abc"),
            ("GOOGLE_SERVICE_ACCOUNT", "{}"),
            ("SHEET_RANGE", "Productos!A:H"),
        ]))
        .unwrap();
        match config.source().unwrap() {
            Source::Sheets { spreadsheet_id, range, .. } => {
                assert_eq!(spreadsheet_id, "abc");
                assert_eq!(range, "Productos!A:H");
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn missing_source_is_rejected() {
        assert!(Config::from_vars(vars(&[])).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::from_vars(vars(&[
            ("SHEET_CSV_URL", "https://example.com/x.csv"),
            ("OFFER_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("OFFER_INTERVAL_SECS"));
    }
}
