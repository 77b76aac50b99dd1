use kanban_core::db::migrations::latest_version;
use kanban_core::db::{
    open_db, open_db_from_kind, open_db_in_memory, open_db_with_config, DbError,
};
use kanban_core::{ConfigError, DatabaseConfig, RepoError, SqliteKanbanRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "boards");
    assert_table_exists(&conn, "columns");
    assert_table_exists(&conn, "cards");
}

#[test]
fn foreign_keys_are_enabled() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kanban.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "boards");
}

#[test]
fn open_db_with_config_opens_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = DatabaseConfig::from_kind("sqlite", path.to_str()).unwrap();

    let conn = open_db_with_config(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

#[test]
fn open_db_from_kind_opens_sqlite_and_memory_backends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("by_kind.db");

    let conn = open_db_from_kind("SQLite", path.to_str()).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());

    let conn = open_db_from_kind("memory", None).unwrap();
    assert_table_exists(&conn, "cards");
}

#[test]
fn open_db_from_kind_rejects_unsupported_backends_as_config_errors() {
    let err = open_db_from_kind("postgresql", None).unwrap_err();
    match &err {
        DbError::Config(ConfigError::UnsupportedBackend(kind)) => assert_eq!(kind, "postgresql"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
    assert!(!err.is_busy());

    let err = open_db_from_kind("file", Some("  ")).unwrap_err();
    assert!(matches!(err, DbError::Config(ConfigError::EmptyPath)));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteKanbanRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn repository_rejects_connection_missing_cards_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE cards;").unwrap();

    let err = SqliteKanbanRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("cards")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
