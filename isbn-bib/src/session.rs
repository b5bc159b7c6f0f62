//! Session accumulation
//!
//! Holds the ordered record set for one run: the prior set loaded from the
//! destination (interactive mode only) followed by this run's results, plus
//! the per-run counters.

use std::path::Path;

use isbn_common::BibliographicRecord;
use tracing::{info, warn};

use crate::store::{RecordStore, StoreError};

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunStats {
    fn record(&mut self, record: &BibliographicRecord) {
        self.processed += 1;
        if record.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Ordered record set plus counters for one run
#[derive(Debug, Default)]
pub struct SessionAccumulator {
    records: Vec<BibliographicRecord>,
    prior_len: usize,
    stats: RunStats,
}

impl SessionAccumulator {
    /// Accumulator with no prior records (batch mode)
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator seeded with a previously persisted record set
    pub fn with_prior(prior: Vec<BibliographicRecord>) -> Self {
        Self {
            prior_len: prior.len(),
            records: prior,
            stats: RunStats::default(),
        }
    }

    /// Load the prior set from the destination.
    ///
    /// A missing file starts an empty session. An unreadable file, or one
    /// without the expected layout, also starts empty but is logged; it
    /// never aborts the run.
    pub fn resume(store: &dyn RecordStore, path: &Path, sheet: &str) -> Self {
        match store.load_records(path, sheet) {
            Ok(Some(prior)) => {
                info!(
                    "Resuming session with {} existing records from {}",
                    prior.len(),
                    path.display()
                );
                Self::with_prior(prior)
            }
            Ok(None) => {
                info!(
                    "Output file {} not found. A new file will be created",
                    path.display()
                );
                Self::new()
            }
            Err(e) => {
                warn!(
                    "Could not load existing records ({}). Starting a new record set",
                    e
                );
                Self::new()
            }
        }
    }

    /// Append one resolved record and update the counters
    pub fn push(&mut self, record: BibliographicRecord) {
        self.stats.record(&record);
        self.records.push(record);
    }

    /// Full ordered set: prior records first, then this run's in order
    pub fn records(&self) -> &[BibliographicRecord] {
        &self.records
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn prior_len(&self) -> usize {
        self.prior_len
    }

    /// Write the full set wholesale to the destination
    pub fn persist(
        &self,
        store: &dyn RecordStore,
        path: &Path,
        sheet: &str,
    ) -> Result<usize, StoreError> {
        store.write_records(&self.records, path, sheet)
    }
}
