//! Storage configuration.
//!
//! # Responsibility
//! - Describe which SQLite backend a process opens at startup.
//! - Parse backend kinds from loosely formatted user input.
//!
//! # Invariants
//! - Only SQLite backends are supported; other kinds are rejected at parse time.
//! - A file backend always carries a non-empty path.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Busy timeout applied when no explicit value is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default database file name for file-backed storage.
pub const DEFAULT_DB_FILE_NAME: &str = "kanban.db";

/// Errors from configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Backend kind is not one of `sqlite|file|memory`.
    UnsupportedBackend(String),
    /// File backend was requested without a path.
    EmptyPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedBackend(kind) => write!(
                f,
                "unsupported database backend `{kind}`; expected sqlite|file|memory"
            ),
            Self::EmptyPath => write!(f, "database path cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// SQLite storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Database file on local disk.
    File(PathBuf),
    /// Private in-memory database, dropped with its connection.
    Memory,
}

/// Process-wide database settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// How long a writer waits for another connection's write lock.
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a file-backed configuration with default timeouts.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageBackend::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Creates an in-memory configuration with default timeouts.
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Parses a backend kind and optional path.
    ///
    /// `sqlite` and `file` select a file backend; a missing path falls back to
    /// [`DEFAULT_DB_FILE_NAME`]. `memory` ignores the path.
    ///
    /// # Errors
    /// - [`ConfigError::UnsupportedBackend`] for any other kind.
    /// - [`ConfigError::EmptyPath`] when a blank path is supplied for a file backend.
    pub fn from_kind(kind: &str, path: Option<&str>) -> Result<Self, ConfigError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "file" => {
                let path = match path {
                    None => DEFAULT_DB_FILE_NAME,
                    Some(value) if value.trim().is_empty() => return Err(ConfigError::EmptyPath),
                    Some(value) => value.trim(),
                };
                Ok(Self::file(path))
            }
            "memory" => Ok(Self::memory()),
            other => Err(ConfigError::UnsupportedBackend(other.to_string())),
        }
    }

    /// Overrides the busy timeout.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}
