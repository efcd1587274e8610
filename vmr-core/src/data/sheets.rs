//! Google Sheets v4 table source.
//!
//! One fetch = token (cached) + optional worksheet lookup + one values read.
//! No retries: a failed call surfaces immediately to the query layer.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use super::auth::{ServiceAccountKey, TokenProvider};
use super::provider::{SourceKind, StoreError, TableSource};
use super::records::parse_records;
use crate::domain::Table;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Connection settings for a spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Worksheet title. `None` reads the first sheet.
    pub worksheet: Option<String>,
    pub api_base: String,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

pub struct SheetsSource {
    client: Client,
    tokens: TokenProvider,
    config: SheetsConfig,
}

impl SheetsSource {
    pub fn new(config: SheetsConfig, key: ServiceAccountKey) -> Result<Self, StoreError> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::Config("spreadsheet_id is empty".into()));
        }
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("vmr-observatory/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;
        let tokens = TokenProvider::new(key)?;
        Ok(Self {
            client,
            tokens,
            config,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| StoreError::Config(format!("invalid api_base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Config("api_base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<Response, StoreError> {
        let token = self.tokens.bearer(&self.client)?;
        let resp = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        check_status(resp)
    }

    fn worksheet_title(&self) -> Result<String, StoreError> {
        if let Some(title) = &self.config.worksheet {
            return Ok(title.clone());
        }
        let url = self.url(&["v4", "spreadsheets", &self.config.spreadsheet_id])?;
        let meta: SpreadsheetMeta = self
            .get(url, &[("fields", "sheets.properties.title")])?
            .json()
            .map_err(|e| StoreError::ResponseFormat(format!("spreadsheet metadata: {e}")))?;
        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| StoreError::ResponseFormat("spreadsheet has no worksheets".into()))
    }
}

fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(StoreError::Auth(format!("HTTP {status}: {body}")))
        }
        StatusCode::NOT_FOUND => Err(StoreError::Connection(format!(
            "spreadsheet or worksheet not found (HTTP {status})"
        ))),
        _ => Err(StoreError::Connection(format!("HTTP {status}: {body}"))),
    }
}

impl TableSource for SheetsSource {
    fn name(&self) -> &str {
        "google_sheets"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::GoogleSheets
    }

    fn fetch_all(&self) -> Result<Table, StoreError> {
        let sheet = self.worksheet_title()?;
        let url = self.url(&[
            "v4",
            "spreadsheets",
            &self.config.spreadsheet_id,
            "values",
            &sheet,
        ])?;
        let range: ValueRange = self
            .get(
                url,
                &[
                    ("valueRenderOption", "UNFORMATTED_VALUE"),
                    ("dateTimeRenderOption", "FORMATTED_STRING"),
                ],
            )?
            .json()
            .map_err(|e| StoreError::ResponseFormat(format!("values response: {e}")))?;

        let table = parse_records(&range.values);
        tracing::info!(
            worksheet = %sheet,
            rows = table.len(),
            skipped = table.skipped_rows,
            "fetched signal sheet"
        );
        Ok(table)
    }
}
