//! The spreadsheet the quiz content lives in.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::data::{ingest_sheet, LoadError, RowPolicy, SheetValues};
use crate::models::QuizItem;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Failure to get quiz items out of the upstream data source.
#[derive(Debug)]
pub enum UpstreamFetchError {
    /// The request never produced a response. Errors are stored without their
    /// URL, which carries the API key.
    Request(reqwest::Error),
    /// The upstream answered with a non-success status.
    Status { url: String, status: u16 },
    /// The response body was not the expected JSON.
    Body(reqwest::Error),
    /// The rows could not be turned into quiz items.
    Ingest(LoadError),
}

impl std::fmt::Display for UpstreamFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamFetchError::Request(e) => write!(f, "request failed: {}", e),
            UpstreamFetchError::Status { url, status } => {
                write!(f, "HTTP error! {}: {}", url, status)
            }
            UpstreamFetchError::Body(e) => write!(f, "unreadable response: {}", e),
            UpstreamFetchError::Ingest(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for UpstreamFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamFetchError::Request(e) | UpstreamFetchError::Body(e) => Some(e),
            UpstreamFetchError::Ingest(e) => Some(e),
            UpstreamFetchError::Status { .. } => None,
        }
    }
}

/// Anything that can produce the current list of quiz items.
pub trait SheetSource {
    fn fetch_quiz(&self) -> impl Future<Output = Result<Vec<QuizItem>, UpstreamFetchError>> + Send;
}

/// Reads quiz rows through the Google Sheets `values.get` API.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    client: reqwest::Client,
    /// Endpoint without the API key, safe to show in errors.
    url: String,
    api_key: String,
    policy: RowPolicy,
}

impl GoogleSheets {
    pub fn new(
        base_url: &str,
        sheet_id: &str,
        range: &str,
        api_key: &str,
        policy: RowPolicy,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/v4/spreadsheets/{}/values/{}",
                base_url.trim_end_matches('/'),
                sheet_id,
                range
            ),
            api_key: api_key.to_string(),
            policy,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_values(&self) -> Result<SheetValues, UpstreamFetchError> {
        debug!("Fetching {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| UpstreamFetchError::Request(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamFetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamFetchError::Body(e.without_url()))
    }
}

impl SheetSource for GoogleSheets {
    async fn fetch_quiz(&self) -> Result<Vec<QuizItem>, UpstreamFetchError> {
        let values = self.fetch_values().await?;
        let ingested = ingest_sheet(&values, self.policy).map_err(UpstreamFetchError::Ingest)?;
        Ok(ingested.items)
    }
}
