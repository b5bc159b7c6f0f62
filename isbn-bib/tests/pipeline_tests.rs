//! Resolution pipeline tests
//!
//! Exercises classification, the single-call contract, error records and
//! identifier backfill against an in-memory source.

mod helpers;

use helpers::fake_source::google_volume;
use helpers::FakeSource;
use isbn_bib::{ResolutionError, ResolutionPipeline};
use isbn_common::Classification;
use serde_json::json;
use std::sync::Arc;

fn pipeline(source: &Arc<FakeSource>) -> ResolutionPipeline {
    ResolutionPipeline::with_default_formatter(source.clone())
}

#[tokio::test]
async fn test_invalid_identifier_never_queries() {
    let source = Arc::new(FakeSource::resolving_all());
    let resolution = pipeline(&source).resolve("not-an-isbn").await;

    assert_eq!(source.call_count(), 0);
    assert_eq!(resolution.failure, Some(ResolutionError::InvalidFormat));
    assert_eq!(resolution.record.input_identifier, "not-an-isbn");
    assert_eq!(resolution.record.error.as_deref(), Some("Invalid ISBN format"));
    assert_eq!(resolution.record.title, None);
    assert_eq!(resolution.record.source, None);
}

#[tokio::test]
async fn test_bad_checksum_is_invalid() {
    let source = Arc::new(FakeSource::resolving_all());
    let resolution = pipeline(&source).resolve("9780306406158").await;

    assert_eq!(source.call_count(), 0);
    assert!(!resolution.is_success());
}

#[tokio::test]
async fn test_not_found_names_source_and_format() {
    let source = Arc::new(FakeSource::empty());
    let resolution = pipeline(&source).resolve("978-0-306-40615-7").await;

    assert_eq!(source.call_count(), 1);
    assert_eq!(
        resolution.record.error.as_deref(),
        Some("No data found by google API for ISBN-13 9780306406157")
    );
    assert_eq!(resolution.record.input_identifier, "978-0-306-40615-7");
    assert!(matches!(
        resolution.failure,
        Some(ResolutionError::NotFound {
            kind: Classification::Isbn13,
            ..
        })
    ));
}

#[tokio::test]
async fn test_isbn10_is_queried_unmodified() {
    let source = Arc::new(FakeSource::empty());
    let resolution = pipeline(&source).resolve("0-306-40615-2").await;

    assert_eq!(source.queries(), vec!["0306406152".to_string()]);
    assert_eq!(
        resolution.record.error.as_deref(),
        Some("No data found by google API for ISBN-10 0306406152")
    );
}

#[tokio::test]
async fn test_resolved_record_keeps_source_identifiers() {
    let source = Arc::new(FakeSource::empty().with_response(
        "9780330508537",
        google_volume("Hitchhiker", "0330508539", "9780330508537"),
    ));
    let resolution = pipeline(&source).resolve("9780330508537").await;

    assert!(resolution.is_success());
    let record = resolution.into_record();
    assert_eq!(record.input_identifier, "9780330508537");
    assert_eq!(record.title.as_deref(), Some("Hitchhiker"));
    assert_eq!(record.authors.as_deref(), Some("Test Author"));
    assert_eq!(record.publication_year.as_deref(), Some("2001"));
    assert_eq!(record.isbn_10.as_deref(), Some("0330508539"));
    assert_eq!(record.source.as_deref(), Some("google"));
    assert_eq!(record.error, None);
}

#[tokio::test]
async fn test_backfill_from_isbn10_input() {
    let source = Arc::new(FakeSource::resolving_all());
    let resolution = pipeline(&source).resolve("0439023521").await;

    assert!(resolution.is_success());
    assert_eq!(resolution.record.isbn_10.as_deref(), Some("0439023521"));
    assert_eq!(resolution.record.isbn_13.as_deref(), Some("9780439023528"));
}

#[tokio::test]
async fn test_backfill_from_isbn13_input() {
    let source = Arc::new(FakeSource::resolving_all());
    let resolution = pipeline(&source).resolve("9780306406157").await;

    assert_eq!(resolution.record.isbn_10, None);
    assert_eq!(resolution.record.isbn_13.as_deref(), Some("9780306406157"));
}

#[tokio::test]
async fn test_formatter_error_keeps_backfilled_identifiers() {
    let source = Arc::new(
        FakeSource::empty().with_response("9780306406157", json!({"kind": "books#volume"})),
    );
    let resolution = pipeline(&source).resolve("9780306406157").await;

    assert_eq!(
        resolution.failure,
        Some(ResolutionError::ParseError(
            "API response missing 'volumeInfo'.".to_string()
        ))
    );
    assert_eq!(
        resolution.record.error.as_deref(),
        Some("API response missing 'volumeInfo'.")
    );
    assert_eq!(resolution.record.isbn_13.as_deref(), Some("9780306406157"));
    assert_eq!(resolution.record.title, None);
}

#[tokio::test]
async fn test_lowercase_x_check_digit() {
    let source = Arc::new(FakeSource::empty());
    pipeline(&source).resolve("080442957x").await;
    assert_eq!(source.queries(), vec!["080442957X".to_string()]);
}
