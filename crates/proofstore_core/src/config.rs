//! Environment-driven store settings.
//!
//! # Responsibility
//! - Resolve database path and logging settings for embedding processes.
//!
//! # Invariants
//! - Blank variables behave as unset.
//! - Resolved settings are validated before any file is touched.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_PATH_VAR: &str = "PROOFSTORE_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "PROOFSTORE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PROOFSTORE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "proofstore.sqlite3";

/// Invalid environment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub source: LoggingError,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.source)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Settings for opening a proof store inside a host process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Normalized log level.
    pub log_level: &'static str,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => normalize_level(&raw).map_err(|source| ConfigError {
                variable: LOG_LEVEL_VAR,
                source,
            })?,
            None => default_log_level(),
        };

        let log_dir = read(LOG_DIR_VAR)
            .map(|raw| {
                normalize_log_dir(Path::new(&raw)).map_err(|source| ConfigError {
                    variable: LOG_DIR_VAR,
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
