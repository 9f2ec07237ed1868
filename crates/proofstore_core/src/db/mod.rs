//! SQLite bootstrap for the proof store.
//!
//! # Responsibility
//! - Open and configure the connection backing a `SqliteProofStore`.
//! - Bring the `proofs` / `admins` schema up to the version this binary knows.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Startup failures (`Open`, `Configure`, `Migrate`,
//!   `UnsupportedSchemaVersion`) leave no usable connection behind.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file or in-memory handle could not be created.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// Connection pragmas or busy timeout were rejected.
    Configure(rusqlite::Error),
    /// A schema migration script failed; the migration transaction rolled back.
    Migrate {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Engine failure on an already-open store.
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Whether this error happened while bringing a store up.
    ///
    /// Startup errors leave the store unusable; the rest are per-call.
    pub fn is_startup(&self) -> bool {
        !matches!(self, Self::Sqlite(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => write!(f, "cannot open {mode} proof store: {source}"),
            Self::Configure(source) => write!(f, "cannot configure proof store connection: {source}"),
            Self::Migrate { version, source } => {
                write!(f, "proof store migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "proof store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(source) => write!(f, "{source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migrate { source, .. } => Some(source),
            Self::Configure(source) | Self::Sqlite(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
