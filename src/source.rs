use crate::csv;
use crate::error::Result;
use crate::sheets::SheetsClient;
use reqwest::Client;
use tracing::debug;

/// Where the product table lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A published CSV export, fetched with a plain GET.
    Csv { url: String, has_header: bool },
    /// A range read through the Sheets API with a service account.
    Sheets {
        spreadsheet_id: String,
        range: String,
        credentials_json: String,
    },
}

/// Raw cells of one fetch, plus whether the first row names the columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
    pub has_header: bool,
}

/// Fetches the raw CSV text of a published sheet.
pub async fn fetch_csv(client: &Client, url: &str) -> Result<String> {
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!("Fetched {} bytes of CSV from {}", body.len(), url);
    Ok(body)
}

/// Retrieves the table behind `source` as rows of cells.
pub async fn fetch_table(client: &Client, source: &Source) -> Result<RawTable> {
    match source {
        Source::Csv { url, has_header } => {
            let body = fetch_csv(client, url).await?;
            Ok(RawTable {
                rows: csv::parse_records(&body),
                has_header: *has_header,
            })
        }
        Source::Sheets {
            spreadsheet_id,
            range,
            credentials_json,
        } => {
            let sheets = SheetsClient::from_service_account_json(client.clone(), credentials_json)?;
            let rows = sheets.fetch_values(spreadsheet_id, range).await?;
            Ok(RawTable {
                rows,
                has_header: true,
            })
        }
    }
}
