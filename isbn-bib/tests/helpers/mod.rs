//! Test Helper Utilities
//!
//! Shared utilities for testing isbn-bib

#![allow(dead_code)]

pub mod fake_source;
pub mod http_stub;

pub use fake_source::FakeSource;
pub use http_stub::{serve_once, unused_local_url};

use isbn_common::BibliographicRecord;
use std::path::Path;

/// Write a single-column CSV input file
pub fn write_input_csv(path: &Path, column: &str, values: &[&str]) {
    let mut content = format!("{}\n", column);
    for value in values {
        content.push_str(value);
        content.push('\n');
    }
    std::fs::write(path, content).unwrap();
}

/// Minimal successful record for seeding a destination
pub fn seeded_record(input: &str, title: &str) -> BibliographicRecord {
    BibliographicRecord {
        input_identifier: input.to_string(),
        title: Some(title.to_string()),
        source: Some("google".to_string()),
        ..BibliographicRecord::default()
    }
}
