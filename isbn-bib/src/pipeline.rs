//! Per-identifier resolution pipeline
//!
//! `raw -> normalized -> classified -> queried -> formatted`. Every path
//! yields exactly one record; invalid identifiers never reach the network.

use std::sync::Arc;

use isbn_common::isbn::{self, Identifier};
use isbn_common::{BibliographicRecord, Classification};
use thiserror::Error;
use tracing::{info, warn};

use crate::formatter::{RecordFormatter, SourceFormatter};
use crate::services::MetadataSource;

/// Why an identifier did not resolve to a clean record.
///
/// Rendered into the record's `Error` column; never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Invalid ISBN format")]
    InvalidFormat,

    /// Source had no match, or could not be reached
    #[error("No data found by {source_tag} API for {kind} {identifier}")]
    NotFound {
        source_tag: String,
        kind: Classification,
        identifier: String,
    },

    /// Source answered but the formatter could not map the payload
    #[error("{0}")]
    ParseError(String),
}

/// Result of resolving one identifier
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: BibliographicRecord,
    pub failure: Option<ResolutionError>,
}

impl Resolution {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_record(self) -> BibliographicRecord {
        self.record
    }
}

/// Resolves raw identifiers against a single metadata source
#[derive(Clone)]
pub struct ResolutionPipeline {
    source: Arc<dyn MetadataSource>,
    formatter: Arc<dyn RecordFormatter>,
}

impl ResolutionPipeline {
    pub fn new(source: Arc<dyn MetadataSource>, formatter: Arc<dyn RecordFormatter>) -> Self {
        Self { source, formatter }
    }

    pub fn with_default_formatter(source: Arc<dyn MetadataSource>) -> Self {
        Self::new(source, Arc::new(SourceFormatter))
    }

    /// Resolve one raw identifier.
    ///
    /// Makes exactly one source call unless the identifier is invalid.
    pub async fn resolve(&self, raw: &str) -> Resolution {
        let identifier = Identifier::new(raw);
        info!(
            "Processing ISBN: {} (Normalized: {})",
            identifier.raw, identifier.normalized
        );

        if !identifier.is_valid() {
            warn!(
                "Invalid ISBN format: {} (Normalized: {})",
                identifier.raw, identifier.normalized
            );
            let failure = ResolutionError::InvalidFormat;
            let record = BibliographicRecord::failure(&identifier.raw, failure.to_string());
            return Resolution {
                record,
                failure: Some(failure),
            };
        }

        let source_tag = self.source.tag().to_string();
        info!(
            source = %source_tag,
            "Querying API for {}: {}", identifier.classification, identifier.normalized
        );

        let Some(metadata) = self.source.query(&identifier.normalized).await else {
            let failure = ResolutionError::NotFound {
                source_tag,
                kind: identifier.classification,
                identifier: identifier.normalized.clone(),
            };
            warn!(
                "No data found by API for ISBN: {} (Query: {})",
                identifier.raw, identifier.normalized
            );
            let record = BibliographicRecord::failure(&identifier.raw, failure.to_string());
            return Resolution {
                record,
                failure: Some(failure),
            };
        };

        let mut record = self.formatter.format(&metadata, &source_tag);
        record.input_identifier = identifier.raw.clone();
        backfill_identifiers(&mut record, &identifier);

        let failure = record
            .error
            .as_ref()
            .filter(|e| !e.is_empty())
            .map(|e| ResolutionError::ParseError(e.clone()));

        match &failure {
            None => info!(
                "Successfully fetched and formatted data for ISBN: {}",
                identifier.raw
            ),
            Some(e) => warn!(isbn = %identifier.raw, error = %e, "Source data could not be formatted"),
        }

        Resolution { record, failure }
    }
}

/// Fill identifier columns from the validated input when the source left
/// both empty.
fn backfill_identifiers(record: &mut BibliographicRecord, identifier: &Identifier) {
    if record.has_identifiers() {
        return;
    }

    match identifier.classification {
        Classification::Isbn10 => {
            record.isbn_10 = Some(identifier.normalized.clone());
            record.isbn_13 = isbn::to_13(&identifier.normalized);
        }
        Classification::Isbn13 => {
            record.isbn_13 = Some(identifier.normalized.clone());
        }
        Classification::Invalid => {}
    }
}
