//! Bibliographic record model
//!
//! One record per resolved (or failed) identifier. Field names are the
//! persisted column headers, so the serde renames below define the
//! spreadsheet layout.

use serde::{Deserialize, Serialize};

/// Column holding the identifier exactly as it was read or scanned
pub const INPUT_COLUMN: &str = "Input ISBN";

/// Persisted column headers, in output order
pub const COLUMNS: [&str; 17] = [
    INPUT_COLUMN,
    "Title",
    "Subtitle",
    "Authors",
    "Publisher",
    "Publication Date",
    "Publication Year",
    "ISBN-10",
    "ISBN-13",
    "Page Count",
    "Language",
    "Edition",
    "Description",
    "Categories",
    "Cover Image URL",
    "Source API",
    "Error",
];

/// Separator used for multi-valued fields (authors, categories)
pub const LIST_SEPARATOR: &str = ", ";

/// Enriched bibliographic record
///
/// A record with `error` set carries no guarantee about any other field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibliographicRecord {
    #[serde(rename = "Input ISBN", default)]
    pub input_identifier: String,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Subtitle")]
    pub subtitle: Option<String>,
    /// Joined with [`LIST_SEPARATOR`]
    #[serde(rename = "Authors")]
    pub authors: Option<String>,
    #[serde(rename = "Publisher")]
    pub publisher: Option<String>,
    /// Raw date string as supplied by the source
    #[serde(rename = "Publication Date")]
    pub publication_date: Option<String>,
    /// Four-digit year derived from `publication_date`
    #[serde(rename = "Publication Year")]
    pub publication_year: Option<String>,
    #[serde(rename = "ISBN-10")]
    pub isbn_10: Option<String>,
    #[serde(rename = "ISBN-13")]
    pub isbn_13: Option<String>,
    #[serde(rename = "Page Count")]
    pub page_count: Option<u32>,
    /// ISO 639-1 code (e.g. "en")
    #[serde(rename = "Language")]
    pub language: Option<String>,
    /// No supported source provides an edition field
    #[serde(rename = "Edition")]
    pub edition: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    /// Joined with [`LIST_SEPARATOR`]
    #[serde(rename = "Categories")]
    pub categories: Option<String>,
    #[serde(rename = "Cover Image URL")]
    pub cover_image_url: Option<String>,
    /// Tag of the metadata source that produced the record
    #[serde(rename = "Source API")]
    pub source: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl BibliographicRecord {
    /// Empty record tagged with the source that is about to fill it
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// Error-only record for an identifier that could not be resolved
    pub fn failure(input_identifier: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            input_identifier: input_identifier.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// True when no error is attached
    pub fn is_success(&self) -> bool {
        self.error.as_deref().map_or(true, str::is_empty)
    }

    /// True when either identifier column is populated
    pub fn has_identifiers(&self) -> bool {
        self.isbn_10.is_some() || self.isbn_13.is_some()
    }
}

/// Extract a four-digit publication year from a raw date string.
///
/// Handles `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and free-form dates such as
/// `September 1, 2009`: the first run of exactly four digits wins.
pub fn publication_year(raw: &str) -> Option<String> {
    raw.split(|c: char| !c.is_ascii_digit())
        .find(|token| token.len() == 4)
        .map(str::to_string)
}
