//! Common error types for isbn-bib

use thiserror::Error;

/// Common result type for isbn-bib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the library and the tool
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
