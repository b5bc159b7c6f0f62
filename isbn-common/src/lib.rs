//! # ISBN Bibliographer Common Library
//!
//! Shared code for the isbn-bib tool:
//! - ISBN-10 / ISBN-13 codec (normalization, checksums, conversion)
//! - Bibliographic record model and column names
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod isbn;
pub mod record;

pub use config::BibConfig;
pub use error::{Error, Result};
pub use isbn::Classification;
pub use record::BibliographicRecord;
