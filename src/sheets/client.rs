//! Sheets API v4 client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{HEADER, LogStore, ServiceAccountKey, TokenProvider, record_row};
use crate::relay::LogRecord;
use crate::{Error, Result};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const HEADER_RANGE: &str = "A1:F1";
const APPEND_RANGE: &str = "A:F";

/// Values payload for read/write requests
#[derive(Debug, Serialize, Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Writes log rows into one spreadsheet
#[derive(Clone)]
pub struct SheetsStore {
    client: reqwest::Client,
    tokens: TokenProvider,
    spreadsheet_id: String,
    api_url: String,
}

impl SheetsStore {
    #[must_use]
    pub fn new(key: ServiceAccountKey, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens: TokenProvider::new(key),
            spreadsheet_id: spreadsheet_id.into(),
            api_url: SHEETS_API_URL.to_string(),
        }
    }

    /// Point at a different Sheets endpoint
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.api_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Sheets(format!("{action} failed: {status} - {body}")))
    }

    /// Read the first row
    async fn read_header(&self) -> Result<Vec<Vec<String>>> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.values_url(HEADER_RANGE))
            .bearer_auth(token)
            .send()
            .await?;

        let range: ValueRange = Self::check(response, "header read").await?.json().await?;
        Ok(range.values)
    }

    /// Overwrite the first row with the column headers
    async fn write_header(&self) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let body = ValueRange {
            values: vec![HEADER.iter().map(ToString::to_string).collect()],
        };
        let response = self
            .client
            .put(self.values_url(HEADER_RANGE))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        Self::check(response, "header write").await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for SheetsStore {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let body = ValueRange {
            values: vec![record_row(record)],
        };
        let response = self
            .client
            .post(format!("{}:append", self.values_url(APPEND_RANGE)))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        Self::check(response, "append").await?;
        tracing::debug!(spreadsheet_id = %self.spreadsheet_id, "row appended");
        Ok(())
    }

    async fn ensure_header(&self) {
        match self.read_header().await {
            Ok(rows) if rows.iter().any(|row| !row.is_empty()) => {
                tracing::debug!("sheet header already present");
            }
            Ok(_) => match self.write_header().await {
                Ok(()) => tracing::info!("wrote sheet header row"),
                Err(e) => tracing::error!(error = %e, "failed to write sheet header"),
            },
            Err(e) => tracing::error!(error = %e, "failed to read sheet header"),
        }
    }
}
