//! Kanban storage bootstrap.
//!
//! # Responsibility
//! - Turn a [`DatabaseConfig`](crate::config::DatabaseConfig) or a raw
//!   backend kind into a ready SQLite connection.
//! - Own the embedded board/column/card schema and its migration runner.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Hierarchy repositories only see connections returned from this module.

use crate::config::ConfigError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_from_kind, open_db_in_memory, open_db_with_config};

/// Result type used by storage bootstrap.
pub type DbResult<T> = Result<T, DbError>;

/// Errors raised while opening or migrating kanban storage.
#[derive(Debug)]
pub enum DbError {
    /// Backend selection was rejected before any connection was opened.
    Config(ConfigError),
    /// SQLite call failed.
    Sqlite(rusqlite::Error),
    /// The database was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Returns `true` when SQLite reported the database as locked by another
    /// connection past the busy timeout.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == rusqlite::ErrorCode::DatabaseBusy
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid storage config: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "kanban schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<ConfigError> for DbError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
