//! Batch and interactive run drivers
//!
//! Both modes resolve identifiers strictly one at a time through the shared
//! [`ResolutionPipeline`], insert the configured delay before every lookup
//! after the first, and write the accumulated set once at the end.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use isbn_common::{BibConfig, BibliographicRecord};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::input::ScanInput;
use crate::pipeline::ResolutionPipeline;
use crate::services::RateLimiter;
use crate::session::{RunStats, SessionAccumulator};
use crate::store::{RecordStore, StoreError};

/// Run-level errors
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
}

/// Why the interactive loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanExit {
    /// Sentinel token entered
    Sentinel,
    /// Input stream closed
    EndOfStream,
    /// Ctrl+C / SIGTERM
    Interrupted,
}

impl fmt::Display for ScanExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanExit::Sentinel => write!(f, "sentinel entered"),
            ScanExit::EndOfStream => write!(f, "end of input"),
            ScanExit::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub stats: RunStats,
    /// Records loaded from the destination before the run (interactive only)
    pub prior_records: usize,
    /// Rows written to the destination (0 when nothing was written)
    pub records_written: usize,
    /// Interactive loop exit reason
    pub exit: Option<ScanExit>,
    /// Write failure, reported but not fatal
    pub persist_error: Option<String>,
}

/// Per-identifier progress notification
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Batch item `index` of `total` (1-based) resolved
    Batch {
        index: usize,
        total: usize,
        record: &'a BibliographicRecord,
        stats: RunStats,
    },
    /// One scanned identifier resolved
    Scanned {
        record: &'a BibliographicRecord,
        stats: RunStats,
    },
}

/// Drives batch and interactive runs
pub struct Orchestrator {
    config: Arc<BibConfig>,
    pipeline: ResolutionPipeline,
    store: Arc<dyn RecordStore>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<BibConfig>,
        pipeline: ResolutionPipeline,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            config,
            pipeline,
            store,
        }
    }

    /// Resolve every identifier in `input` and overwrite `output`.
    ///
    /// A missing input file aborts before any processing. An unreadable
    /// input or one with no identifiers ends the run with nothing written.
    pub async fn run_batch<F>(
        &self,
        input: &Path,
        output: &Path,
        mut on_progress: F,
    ) -> Result<RunSummary, OrchestratorError>
    where
        F: FnMut(Progress<'_>),
    {
        if !input.exists() {
            error!("Input file not found: {}", input.display());
            return Err(OrchestratorError::InputNotFound(input.to_path_buf()));
        }

        let column = &self.config.identifier_column_name;
        info!("Input file: {}", input.display());
        info!("Output file: {}", output.display());
        info!("Using ISBN column: {}", column);

        let identifiers = match self.store.read_identifiers(input, column) {
            Ok(identifiers) => identifiers,
            Err(e) => {
                error!("Error reading {}: {}", input.display(), e);
                Vec::new()
            }
        };

        if identifiers.is_empty() {
            warn!("No ISBNs found in the input file or an error occurred during reading");
            return Ok(RunSummary::default());
        }

        let total = identifiers.len();
        let mut limiter = RateLimiter::new(self.config.rate_limit_delay());
        let mut session = SessionAccumulator::new();

        for (i, raw) in identifiers.iter().enumerate() {
            info!("Processing ISBN {}/{}: {}", i + 1, total, raw);
            limiter.wait().await;

            let resolution = self.pipeline.resolve(raw).await;
            session.push(resolution.into_record());

            if let Some(record) = session.records().last() {
                on_progress(Progress::Batch {
                    index: i + 1,
                    total,
                    record,
                    stats: session.stats(),
                });
            }
        }

        Ok(self.finish(&session, output, None))
    }

    /// Resolve scanned identifiers until the sentinel, end of input, or
    /// cancellation, then write prior records plus this session's to
    /// `output`.
    ///
    /// Never fails: load and write problems are logged and reported in the
    /// summary.
    pub async fn run_interactive<F>(
        &self,
        output: &Path,
        input: &mut dyn ScanInput,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> RunSummary
    where
        F: FnMut(Progress<'_>),
    {
        let sheet = &self.config.output_sheet_name;
        let sentinel = self.config.scan_sentinel.as_str();

        let mut session = SessionAccumulator::resume(self.store.as_ref(), output, sheet);
        let mut limiter = RateLimiter::new(self.config.rate_limit_delay());

        info!(sentinel = %sentinel, "Interactive scanning started");

        let exit = loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => break ScanExit::Interrupted,
                line = input.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => break ScanExit::EndOfStream,
                Err(e) => {
                    error!("Failed to read scanner input: {}", e);
                    break ScanExit::EndOfStream;
                }
            };

            let raw = line.trim();
            if raw == sentinel {
                break ScanExit::Sentinel;
            }
            if raw.is_empty() {
                continue;
            }

            // An accepted line is always resolved; cancellation only cuts
            // the delay short and ends the loop after this lookup
            let interrupted = tokio::select! {
                biased;
                _ = cancel.cancelled() => true,
                _ = limiter.wait() => false,
            };

            let resolution = self.pipeline.resolve(raw).await;
            session.push(resolution.into_record());

            if let Some(record) = session.records().last() {
                on_progress(Progress::Scanned {
                    record,
                    stats: session.stats(),
                });
            }

            if interrupted {
                break ScanExit::Interrupted;
            }
        };

        info!("Interactive scanning ended: {}", exit);
        self.finish(&session, output, Some(exit))
    }

    fn finish(
        &self,
        session: &SessionAccumulator,
        output: &Path,
        exit: Option<ScanExit>,
    ) -> RunSummary {
        let mut summary = RunSummary {
            stats: session.stats(),
            prior_records: session.prior_len(),
            exit,
            ..RunSummary::default()
        };

        match session.persist(self.store.as_ref(), output, &self.config.output_sheet_name) {
            Ok(written) => {
                info!(
                    "Bibliography data successfully written to {}",
                    output.display()
                );
                summary.records_written = written;
            }
            Err(StoreError::Empty) => {
                info!("No bibliography data was generated to write");
            }
            Err(e) => {
                error!(
                    "Failed to write bibliography data to {}: {}",
                    output.display(),
                    e
                );
                summary.persist_error = Some(e.to_string());
            }
        }

        info!(
            processed = summary.stats.processed,
            succeeded = summary.stats.succeeded,
            failed = summary.stats.failed,
            "Run complete"
        );
        summary
    }
}
