use crate::error::{Error, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const SHEETS_API_URL: &str = "https://sheets.googleapis.com";
const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;

/// The fields of a Google service account key file that the token exchange needs.
#[derive(Deserialize, Debug, Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Read-only client for the Sheets `values` endpoint.
pub struct SheetsClient {
    client: Client,
    account: ServiceAccount,
    api_url: String,
}

impl SheetsClient {
    pub fn new(client: Client, account: ServiceAccount) -> Self {
        SheetsClient {
            client,
            account,
            api_url: SHEETS_API_URL.to_string(),
        }
    }

    pub fn from_service_account_json(client: Client, json: &str) -> Result<Self> {
        let account: ServiceAccount = serde_json::from_str(json)?;
        Ok(Self::new(client, account))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Signs a JWT with the service account key and trades it for an access token.
    pub async fn access_token(&self) -> Result<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::SourceFetch(format!("System clock is before 1970: {}", e)))?
            .as_secs();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: READONLY_SCOPE,
            aud: &self.account.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let response: TokenResponse = self
            .client
            .post(&self.account.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Obtained Sheets access token for {}", self.account.client_email);
        Ok(response.access_token)
    }

    /// Reads `range` (e.g. `Productos!A:H`) as rows of cell strings.
    pub async fn fetch_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, range)?;
        let token = self.access_token().await?;

        let values: ValueRange = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Builds the `values` URL with the id and range percent-encoded as path segments.
    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| Error::SourceFetch(format!("Invalid Sheets API URL {}: {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::SourceFetch(format!("Sheets API URL {} cannot take a path", self.api_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
