//! Embedded kanban schema migrations.
//!
//! # Responsibility
//! - Register the board/column/card schema steps in strictly increasing order.
//! - Bring a connection up to [`latest_version`] in one transaction.
//!
//! # Invariants
//! - `version` values start at 1 and increase by exactly 1 per step.
//! - `PRAGMA user_version` mirrors the last applied step.
//! - A database newer than this build is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "init_boards_columns_cards",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest schema version known by this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies every migration newer than the connection's `user_version`.
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the database is newer than
///   [`latest_version`].
/// - [`DbError::Sqlite`] when a step fails; no step of the run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = pending_after(current_version).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    for migration in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

fn pending_after(current_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > current_version)
}
