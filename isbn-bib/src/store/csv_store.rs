//! CSV record store
//!
//! Column headers are the record's serde names. CSV has no sheets, so a
//! destination counts as holding the expected sheet when its header row
//! contains the `Input ISBN` column.

use super::{RecordStore, StoreError};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use isbn_common::record::INPUT_COLUMN;
use isbn_common::BibliographicRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const UTF8_BOM: char = '\u{feff}';

/// Store backed by comma-separated files
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvStore;

impl CsvStore {
    pub fn new() -> Self {
        Self
    }
}

/// Header row with surrounding whitespace and a leading BOM removed
fn clean_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
            h.trim()
        })
        .collect()
}

/// Sibling path used for atomic replacement of `path`
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_csv(path: &Path, records: &[BibliographicRecord]) -> Result<(), StoreError> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

impl RecordStore for CsvStore {
    fn read_identifiers(&self, path: &Path, column: &str) -> Result<Vec<String>, StoreError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = clean_headers(reader.headers()?);

        let Some(index) = headers.iter().position(|h| h == column) else {
            return Err(StoreError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
                available: headers.iter().map(str::to_string).collect(),
            });
        };

        let mut identifiers = Vec::new();
        for row in reader.records() {
            let row = row?;
            if let Some(value) = row.get(index).map(str::trim).filter(|v| !v.is_empty()) {
                identifiers.push(value.to_string());
            }
        }

        info!(
            "Successfully read {} identifiers from column '{}' in {}",
            identifiers.len(),
            column,
            path.display()
        );
        Ok(identifiers)
    }

    fn load_records(
        &self,
        path: &Path,
        sheet: &str,
    ) -> Result<Option<Vec<BibliographicRecord>>, StoreError> {
        if !path.exists() {
            debug!("No existing record set at {}", path.display());
            return Ok(None);
        }

        let mut reader = ReaderBuilder::new().from_path(path)?;
        let headers = clean_headers(reader.headers()?);
        if !headers.iter().any(|h| h == INPUT_COLUMN) {
            return Err(StoreError::MissingSheet {
                sheet: sheet.to_string(),
                path: path.to_path_buf(),
            });
        }
        reader.set_headers(headers);

        let records = reader
            .deserialize()
            .collect::<Result<Vec<BibliographicRecord>, _>>()
            .map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        info!(
            "Loaded {} existing records from {}",
            records.len(),
            path.display()
        );
        Ok(Some(records))
    }

    fn write_records(
        &self,
        records: &[BibliographicRecord],
        path: &Path,
        sheet: &str,
    ) -> Result<usize, StoreError> {
        if records.is_empty() {
            warn!("No data provided to write to {}", path.display());
            return Err(StoreError::Empty);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write to a sibling temp file, then rename over the destination
        let temp = temp_path(path);
        if let Err(e) = write_csv(&temp, records) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        info!(
            sheet = %sheet,
            "Wrote {} records to {}",
            records.len(),
            path.display()
        );
        Ok(records.len())
    }
}
