//! Persisted record sets
//!
//! A store reads identifier lists and prior record sets, and overwrites the
//! destination wholesale. The `sheet` argument names the record layout
//! inside the destination; stores without sheets validate the header layout
//! instead.

pub mod csv_store;

pub use csv_store::CsvStore;

use isbn_common::BibliographicRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found in {}. Available columns: {}", .path.display(), .available.join(", "))]
    MissingColumn {
        column: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("Sheet '{sheet}' not found in {}", .path.display())]
    MissingSheet { sheet: String, path: PathBuf },

    #[error("Failed to parse {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("No data to write")]
    Empty,
}

/// Spreadsheet-like record persistence
pub trait RecordStore: Send + Sync {
    /// Raw identifier strings from the named column, in row order.
    ///
    /// Values are trimmed; empty cells are dropped.
    fn read_identifiers(&self, path: &Path, column: &str) -> Result<Vec<String>, StoreError>;

    /// Previously persisted records, or `None` when the file does not exist
    fn load_records(
        &self,
        path: &Path,
        sheet: &str,
    ) -> Result<Option<Vec<BibliographicRecord>>, StoreError>;

    /// Overwrite `path` with `records`; returns the number of rows written
    fn write_records(
        &self,
        records: &[BibliographicRecord],
        path: &Path,
        sheet: &str,
    ) -> Result<usize, StoreError>;
}
