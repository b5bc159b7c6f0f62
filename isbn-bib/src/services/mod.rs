//! Metadata sources and lookup support services
//!
//! Exactly one [`MetadataSource`] is active per run, chosen from the first
//! entry of `source_priority`. Sources swallow every transport failure and
//! report it as absence, so the pipeline only ever sees "metadata" or
//! "nothing".

pub mod google_books_client;
pub mod open_library_client;
pub mod rate_limiter;

pub use google_books_client::GoogleBooksClient;
pub use open_library_client::OpenLibraryClient;
pub use rate_limiter::RateLimiter;

use async_trait::async_trait;
use isbn_common::BibConfig;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Metadata source errors
///
/// Never crosses the [`MetadataSource`] boundary: `query` logs it and
/// returns `None`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A bibliographic metadata service queried by ISBN
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Source tag written to the "Source API" column (e.g. "google")
    fn tag(&self) -> &str;

    /// Look up one normalized ISBN.
    ///
    /// Returns the raw metadata record, or `None` when the source has no
    /// match *or* could not be reached.
    async fn query(&self, identifier: &str) -> Option<Value>;
}

/// Supported metadata sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GoogleBooks,
    OpenLibrary,
}

impl SourceKind {
    /// Parse a `source_priority` entry (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "google" | "googlebooks" | "google_books" => Some(SourceKind::GoogleBooks),
            "openlibrary" | "open_library" => Some(SourceKind::OpenLibrary),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::GoogleBooks => google_books_client::SOURCE_TAG,
            SourceKind::OpenLibrary => open_library_client::SOURCE_TAG,
        }
    }
}

/// Build the single active source from configuration.
///
/// Unknown source names fall back to Google Books with a warning.
pub fn build_source(config: &BibConfig) -> Result<Arc<dyn MetadataSource>, SourceError> {
    let requested = config.active_source();
    let kind = SourceKind::from_name(requested).unwrap_or_else(|| {
        warn!(
            "Unsupported metadata source '{}', falling back to '{}'",
            requested,
            SourceKind::GoogleBooks.tag()
        );
        SourceKind::GoogleBooks
    });

    if config.source_priority.len() > 1 {
        info!(
            "Only one metadata source is active per run; ignoring {} additional source(s)",
            config.source_priority.len() - 1
        );
    }

    let timeout = config.request_timeout();
    let source: Arc<dyn MetadataSource> = match kind {
        SourceKind::GoogleBooks => Arc::new(GoogleBooksClient::new(
            config.metadata_api_key.clone(),
            timeout,
        )?),
        SourceKind::OpenLibrary => Arc::new(OpenLibraryClient::new(timeout)?),
    };

    info!(source = %source.tag(), "Metadata source initialized");
    Ok(source)
}
