//! Open Library Books API client
//!
//! `GET /api/books?bibkeys=ISBN:{isbn}&format=json&jscmd=data` returns an
//! object keyed by bibkey; a missing key means no match.

use super::{MetadataSource, SourceError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

pub const SOURCE_TAG: &str = "openlibrary";

const OPEN_LIBRARY_API_URL: &str = "https://openlibrary.org/api/books";

/// Open Library API client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(isbn_common::config::user_agent())
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: OPEN_LIBRARY_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up an edition by ISBN
    pub async fn lookup(&self, isbn: &str) -> Result<Option<Value>, SourceError> {
        let bibkey = bibkey(isbn);

        tracing::debug!(isbn = %isbn, url = %self.base_url, "Querying Open Library API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("bibkeys", bibkey.as_str()),
                ("format", "json"),
                ("jscmd", "data"),
            ])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::Api(status.as_u16(), error_text));
        }

        let mut body: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(body.remove(&bibkey))
    }
}

fn bibkey(isbn: &str) -> String {
    format!("ISBN:{}", isbn)
}

#[async_trait]
impl MetadataSource for OpenLibraryClient {
    fn tag(&self) -> &str {
        SOURCE_TAG
    }

    async fn query(&self, identifier: &str) -> Option<Value> {
        match self.lookup(identifier).await {
            Ok(Some(edition)) => Some(edition),
            Ok(None) => {
                tracing::warn!(isbn = %identifier, "No edition found for ISBN in Open Library response");
                None
            }
            Err(e) => {
                tracing::error!(isbn = %identifier, error = %e, "Open Library lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bibkey() {
        assert_eq!(bibkey("9780306406157"), "ISBN:9780306406157");
    }

    #[test]
    fn test_client_creation() {
        assert!(OpenLibraryClient::new(Duration::from_secs(10)).is_ok());
    }
}
