//! Configuration loading
//!
//! The configuration is loaded once at startup into an immutable
//! [`BibConfig`] and passed explicitly to everything that needs it.
//!
//! # Settings Sources Priority
//!
//! 1. Environment variable (`ISBN_BIB_API_KEY`, API key only)
//! 2. Config file given on the command line (`--config`)
//! 3. Platform config file (`~/.config/isbn-bib/config.toml` on Linux)
//! 4. Built-in defaults
//!
//! A missing, unreadable or malformed config file never aborts a run: the
//! problem is logged and defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Environment variable overriding the configured metadata API key
pub const API_KEY_ENV: &str = "ISBN_BIB_API_KEY";

/// Source used when `source_priority` is empty or unrecognised
pub const DEFAULT_SOURCE: &str = "google";

const DEFAULT_DELAY_SECS: f64 = 1.0;
const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Config file syntax, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Immutable run configuration
///
/// Every key is optional in the file; missing keys take the defaults below.
/// The aliases accept the key names used by earlier JSON config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibConfig {
    /// Optional credential for the metadata source
    #[serde(alias = "google_books_api_key")]
    pub metadata_api_key: Option<String>,

    /// Input column holding the identifiers (default "ISBN")
    #[serde(alias = "isbn_column_name")]
    pub identifier_column_name: String,

    /// Output sheet name (default "Bibliography")
    pub output_sheet_name: String,

    /// Ordered source names; only the first is used (default ["google"])
    #[serde(alias = "api_source_priority")]
    pub source_priority: Vec<String>,

    /// Delay between consecutive lookups in seconds (default 1)
    #[serde(alias = "rate_limit_delay")]
    pub rate_limit_delay_seconds: f64,

    /// HTTP request timeout in seconds (default 10)
    pub request_timeout_seconds: f64,

    /// Case-sensitive token that ends an interactive session (default "DONE")
    pub scan_sentinel: String,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for BibConfig {
    fn default() -> Self {
        Self {
            metadata_api_key: None,
            identifier_column_name: "ISBN".to_string(),
            output_sheet_name: "Bibliography".to_string(),
            source_priority: vec![DEFAULT_SOURCE.to_string()],
            rate_limit_delay_seconds: DEFAULT_DELAY_SECS,
            request_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            scan_sentinel: "DONE".to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BibConfig {
    /// Load configuration, degrading to defaults on any problem.
    ///
    /// With no explicit path the platform config file is used when it exists.
    /// The API key is then resolved against [`API_KEY_ENV`].
    pub fn load(path: Option<&Path>) -> Self {
        let config = match path {
            Some(path) => Self::load_or_default(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::load_or_default(&path),
                None => {
                    info!("No config file specified. Using default configuration");
                    Self::default()
                }
            },
        };

        let api_key = resolve_api_key(config.metadata_api_key.as_deref());
        Self {
            metadata_api_key: api_key,
            ..config
        }
    }

    fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            warn!(
                "Configuration file {} not found. Using default configuration",
                path.display()
            );
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                error!("{}. Using default configuration", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file (format chosen by extension)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, ConfigFormat::from_path(path))
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))
    }

    /// Parse config text, then replace out-of-range values with defaults
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?,
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| Error::Config(format!("Parse JSON failed: {}", e)))?,
        };
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !self.rate_limit_delay_seconds.is_finite() || self.rate_limit_delay_seconds < 0.0 {
            warn!(
                value = self.rate_limit_delay_seconds,
                "Invalid rate_limit_delay_seconds, using default {}", DEFAULT_DELAY_SECS
            );
            self.rate_limit_delay_seconds = defaults.rate_limit_delay_seconds;
        }

        if !self.request_timeout_seconds.is_finite() || self.request_timeout_seconds <= 0.0 {
            warn!(
                value = self.request_timeout_seconds,
                "Invalid request_timeout_seconds, using default {}", DEFAULT_TIMEOUT_SECS
            );
            self.request_timeout_seconds = defaults.request_timeout_seconds;
        }

        if self.scan_sentinel.trim().is_empty() {
            warn!("Empty scan_sentinel, using default '{}'", defaults.scan_sentinel);
            self.scan_sentinel = defaults.scan_sentinel;
        }

        if self.identifier_column_name.is_empty() {
            warn!("Empty identifier_column_name, using default");
            self.identifier_column_name = defaults.identifier_column_name;
        }

        if self.output_sheet_name.is_empty() {
            warn!("Empty output_sheet_name, using default");
            self.output_sheet_name = defaults.output_sheet_name;
        }

        self
    }

    /// Delay inserted before every lookup after the first
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit_delay_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_DELAY_SECS))
    }

    /// Total timeout for one metadata request
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_seconds)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    /// Name of the single active source (first entry of `source_priority`)
    pub fn active_source(&self) -> &str {
        self.source_priority
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_SOURCE)
    }
}

/// Platform config file location (`<config dir>/isbn-bib/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("isbn-bib").join("config.toml"))
}

/// Resolve the metadata API key: environment first, then config file.
///
/// Blank values count as absent. Warns when both sources are set.
pub fn resolve_api_key(file_key: Option<&str>) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let file_key = file_key.filter(|k| is_valid_key(k));

    match (env_key, file_key) {
        (Some(env_key), Some(_)) => {
            warn!(
                "Metadata API key found in both {} and config file. Using environment",
                API_KEY_ENV
            );
            Some(env_key)
        }
        (Some(env_key), None) => {
            info!("Metadata API key loaded from environment variable");
            Some(env_key)
        }
        (None, Some(file_key)) => {
            info!("Metadata API key loaded from config file");
            Some(file_key.to_string())
        }
        (None, None) => None,
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User-Agent sent with every metadata request
pub fn user_agent() -> String {
    format!("isbn-bib/{}", env!("CARGO_PKG_VERSION"))
}
