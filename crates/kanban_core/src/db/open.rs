//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by the hierarchy invariants.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` so column/card cascades fire.
//! - Returned connections have a busy timeout, so concurrent writers queue
//!   behind `BEGIN IMMEDIATE` instead of failing at once.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::{DatabaseConfig, StorageBackend, DEFAULT_BUSY_TIMEOUT};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", DEFAULT_BUSY_TIMEOUT, || Connection::open(path))
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", DEFAULT_BUSY_TIMEOUT, Connection::open_in_memory)
}

/// Opens the backend described by `config`.
pub fn open_db_with_config(config: &DatabaseConfig) -> DbResult<Connection> {
    match &config.backend {
        StorageBackend::File(path) => {
            open_with("file", config.busy_timeout, || Connection::open(path))
        }
        StorageBackend::Memory => {
            open_with("memory", config.busy_timeout, Connection::open_in_memory)
        }
    }
}

/// Parses a backend kind (`sqlite|file|memory`) and opens it.
///
/// # Errors
/// - [`DbError::Config`](super::DbError::Config) when the kind or path is
///   rejected; no connection is opened.
/// - Any error from [`open_db_with_config`].
pub fn open_db_from_kind(kind: &str, path: Option<&str>) -> DbResult<Connection> {
    let config = DatabaseConfig::from_kind(kind, path).inspect_err(|err| {
        error!("event=db_open module=db status=error error_code=db_config_rejected error={err}");
    })?;
    open_db_with_config(&config)
}

fn open_with(
    mode: &'static str,
    busy_timeout: Duration,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match connect() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
