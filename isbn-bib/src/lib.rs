//! isbn-bib library interface
//!
//! Turns raw ISBN strings (from a CSV column or a barcode scanner) into
//! bibliographic records by validating each identifier, querying one
//! metadata source, and merging the results into a persisted record set.

pub mod formatter;
pub mod input;
pub mod orchestrator;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod store;

pub use crate::formatter::{RecordFormatter, SourceFormatter};
pub use crate::input::{ScanInput, ScriptedInput, StdinScanner};
pub use crate::orchestrator::{Orchestrator, OrchestratorError, Progress, RunSummary, ScanExit};
pub use crate::pipeline::{Resolution, ResolutionError, ResolutionPipeline};
pub use crate::services::{build_source, MetadataSource, SourceError};
pub use crate::session::{RunStats, SessionAccumulator};
pub use crate::store::{CsvStore, RecordStore, StoreError};
