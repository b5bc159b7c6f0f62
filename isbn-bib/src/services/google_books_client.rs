//! Google Books API client
//!
//! `GET /books/v1/volumes?q=isbn:{isbn}`; the first returned volume is the
//! metadata record. Requests are unauthenticated unless an API key is
//! configured.

use super::{MetadataSource, SourceError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const SOURCE_TAG: &str = "google";

const GOOGLE_BOOKS_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

/// Volume search response (only the fields needed to pick a volume)
#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(rename = "totalItems", default)]
    total_items: u64,
    #[serde(default)]
    items: Option<Vec<Value>>,
}

/// Google Books API client
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(isbn_common::config::user_agent())
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: GOOGLE_BOOKS_API_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at another endpoint (mirrors, local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up a volume by ISBN
    ///
    /// Returns `Ok(None)` when the search succeeds but matches nothing.
    pub async fn lookup(&self, isbn: &str) -> Result<Option<Value>, SourceError> {
        let mut params = vec![("q", format!("isbn:{}", isbn))];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }

        tracing::debug!(isbn = %isbn, url = %self.base_url, "Querying Google Books API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let body: VolumesResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(first_volume(body))
    }
}

/// First volume of a search response, if the search matched anything
fn first_volume(response: VolumesResponse) -> Option<Value> {
    if response.total_items == 0 {
        return None;
    }
    response.items.and_then(|items| items.into_iter().next())
}

#[async_trait]
impl MetadataSource for GoogleBooksClient {
    fn tag(&self) -> &str {
        SOURCE_TAG
    }

    async fn query(&self, identifier: &str) -> Option<Value> {
        match self.lookup(identifier).await {
            Ok(Some(volume)) => Some(volume),
            Ok(None) => {
                tracing::warn!(
                    isbn = %identifier,
                    "No items found for ISBN in Google Books API response"
                );
                None
            }
            Err(e) => {
                tracing::error!(isbn = %identifier, error = %e, "Google Books lookup failed");
                None
            }
        }
    }
}
