//! Raw metadata to [`BibliographicRecord`] conversion
//!
//! Formatting never fails: a payload that lacks the expected substructure
//! yields a record whose `Error` explains what was missing and whose other
//! fields (besides `Source API`) are empty.

use isbn_common::record::{publication_year, LIST_SEPARATOR};
use isbn_common::BibliographicRecord;
use serde::Deserialize;
use serde_json::Value;

use crate::services::{google_books_client, open_library_client};

/// Converts a source's raw metadata record into a bibliographic record
pub trait RecordFormatter: Send + Sync {
    fn format(&self, metadata: &Value, source: &str) -> BibliographicRecord;
}

/// Formatter that dispatches on the source tag
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceFormatter;

impl RecordFormatter for SourceFormatter {
    fn format(&self, metadata: &Value, source: &str) -> BibliographicRecord {
        let mut record = BibliographicRecord::for_source(source);

        let Some(object) = metadata.as_object() else {
            tracing::warn!(source = %source, "Formatter received a non-object API response");
            record.error = Some("Invalid API response received for formatting.".to_string());
            return record;
        };

        let result = match source.to_ascii_lowercase().as_str() {
            google_books_client::SOURCE_TAG => format_google_volume(object, &mut record),
            open_library_client::SOURCE_TAG => format_open_library_edition(object, &mut record),
            _ => {
                tracing::warn!("No formatting logic implemented for source API: {}", source);
                Err(format!("Unsupported source API: {}", source))
            }
        };

        if let Err(message) = result {
            // Partial field maps are discarded so an error record stays error-only
            let mut failed = BibliographicRecord::for_source(source);
            failed.error = Some(message);
            return failed;
        }

        record
    }
}

// ============================================================================
// Google Books
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    authors: Option<Vec<String>>,
    publisher: Option<String>,
    published_date: Option<String>,
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
    page_count: Option<u32>,
    language: Option<String>,
    description: Option<String>,
    categories: Option<Vec<String>>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

fn format_google_volume(
    volume: &serde_json::Map<String, Value>,
    record: &mut BibliographicRecord,
) -> Result<(), String> {
    let info = match volume.get("volumeInfo") {
        Some(Value::Object(info)) if !info.is_empty() => info,
        _ => return Err("API response missing 'volumeInfo'.".to_string()),
    };

    let info: VolumeInfo = serde_json::from_value(Value::Object(info.clone()))
        .map_err(|e| format!("Failed to parse volumeInfo: {}", e))?;

    record.title = info.title;
    record.subtitle = info.subtitle;
    record.authors = joined(info.authors);
    record.publisher = info.publisher;
    record.publication_year = info.published_date.as_deref().and_then(google_year);
    record.publication_date = info.published_date;

    for id in info.industry_identifiers.unwrap_or_default() {
        match id.kind.as_deref() {
            Some("ISBN_10") => record.isbn_10 = id.identifier,
            Some("ISBN_13") => record.isbn_13 = id.identifier,
            _ => {}
        }
    }

    record.page_count = info.page_count;
    record.language = info.language;
    record.description = info.description;
    record.categories = joined(info.categories);
    record.cover_image_url = info
        .image_links
        .and_then(|links| links.thumbnail.or(links.small_thumbnail));

    Ok(())
}

/// Google dates are `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; the year is the
/// first dash-separated segment when it is exactly four digits.
fn google_year(date: &str) -> Option<String> {
    let year = date.split('-').next()?;
    (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())).then(|| year.to_string())
}

// ============================================================================
// Open Library
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenLibraryEdition {
    title: Option<String>,
    subtitle: Option<String>,
    authors: Option<Vec<Named>>,
    publishers: Option<Vec<Named>>,
    publish_date: Option<String>,
    identifiers: Option<OpenLibraryIdentifiers>,
    number_of_pages: Option<u32>,
    subjects: Option<Vec<Named>>,
    cover: Option<OpenLibraryCover>,
    notes: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryIdentifiers {
    isbn_10: Option<Vec<String>>,
    isbn_13: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

fn format_open_library_edition(
    edition: &serde_json::Map<String, Value>,
    record: &mut BibliographicRecord,
) -> Result<(), String> {
    if !edition.contains_key("title") {
        return Err("API response missing 'title'.".to_string());
    }

    let edition: OpenLibraryEdition = serde_json::from_value(Value::Object(edition.clone()))
        .map_err(|e| format!("Failed to parse Open Library record: {}", e))?;

    record.title = edition.title;
    record.subtitle = edition.subtitle;
    record.authors = joined(names(edition.authors));
    record.publisher = edition
        .publishers
        .and_then(|p| p.into_iter().next())
        .map(|p| p.name);
    record.publication_year = edition.publish_date.as_deref().and_then(publication_year);
    record.publication_date = edition.publish_date;

    if let Some(ids) = edition.identifiers {
        record.isbn_10 = ids.isbn_10.and_then(|v| v.into_iter().next());
        record.isbn_13 = ids.isbn_13.and_then(|v| v.into_iter().next());
    }

    record.page_count = edition.number_of_pages;
    record.categories = joined(names(edition.subjects));
    record.cover_image_url = edition
        .cover
        .and_then(|c| c.medium.or(c.large).or(c.small));
    record.description = match edition.notes {
        Some(Value::String(notes)) => Some(notes),
        _ => None,
    };

    Ok(())
}

fn names(list: Option<Vec<Named>>) -> Option<Vec<String>> {
    list.map(|items| items.into_iter().map(|n| n.name).collect())
}

/// Join a list for a single spreadsheet cell; empty lists become absent
fn joined(list: Option<Vec<String>>) -> Option<String> {
    list.filter(|items| !items.is_empty())
        .map(|items| items.join(LIST_SEPARATOR))
}
