//! Board/column/card hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own every hierarchy invariant: default columns, dense positions,
//!   cascading column deletion, board soft delete, cross-column moves.
//! - Keep SQL details and ordering behavior inside repository boundary.
//!
//! # Invariants
//! - Missing records and inactive boards surface as `None`/`false`, never as
//!   errors. Only storage failures and malformed rows are errors.
//! - Every mutation runs in one `BEGIN IMMEDIATE` transaction. The write lock
//!   is taken before siblings are read, so concurrent writers on the same
//!   database cannot assign the same position.
//! - Positions are dense (`0..n`) after every successful mutation.
//! - A board always keeps at least one column.

use super::positions::Siblings;
use super::rows::{
    load_active_board, load_visible_card, load_visible_column, now_epoch_ms, parse_board_row,
    parse_card_row, parse_column_row, BOARD_SELECT_SQL, CARD_SELECT_SQL, COLUMN_SELECT_SQL,
};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::board::{
    Board, BoardId, BoardWithColumns, Column, ColumnId, ExternalId, DEFAULT_COLUMN_TITLES,
};
use crate::model::card::{Card, CardId, CardPatch, NewCard};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by hierarchy repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from hierarchy repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "kanban repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "kanban repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "kanban repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid kanban data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the board -> column -> card hierarchy.
pub trait HierarchyRepository {
    /// Creates one board with its default columns in a single transaction.
    fn create_board(&self, name: &str, description: Option<&str>)
        -> RepoResult<BoardWithColumns>;
    /// Loads one active board.
    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>>;
    /// Loads one active board by its public identifier.
    fn find_board_by_external_id(&self, external_id: ExternalId) -> RepoResult<Option<Board>>;
    /// Lists active boards ordered by id.
    fn list_boards(&self) -> RepoResult<Vec<Board>>;
    /// Applies supplied non-empty fields to an active board.
    fn update_board(
        &self,
        board_id: BoardId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> RepoResult<Option<Board>>;
    /// Soft-deletes one board.
    ///
    /// Returns `false` only when no board row exists. Deleting an already
    /// inactive board succeeds without touching the row.
    fn delete_board(&self, board_id: BoardId) -> RepoResult<bool>;

    /// Creates one column, appended or inserted at `position`.
    ///
    /// # Contract
    /// - Positions are read and assigned under a `BEGIN IMMEDIATE` write lock;
    ///   concurrent writers wait up to the connection busy timeout, then fail
    ///   with a busy error.
    /// - Sibling columns stay dense (`0..n`) after commit.
    fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>>;
    /// Loads one column of an active board.
    fn get_column(&self, column_id: ColumnId) -> RepoResult<Option<Column>>;
    /// Lists columns of an active board in position order.
    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>>;
    /// Renames and/or reorders one column.
    fn update_column(
        &self,
        column_id: ColumnId,
        title: Option<&str>,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>>;
    /// Deletes one column and its cards unless it is the board's last column.
    fn delete_column(&self, column_id: ColumnId) -> RepoResult<bool>;

    /// Appends one card to a column.
    ///
    /// # Contract
    /// - The position is the card count read under a `BEGIN IMMEDIATE` write
    ///   lock; concurrent writers wait up to the connection busy timeout.
    fn create_card(&self, column_id: ColumnId, card: &NewCard) -> RepoResult<Option<Card>>;
    /// Loads one card reachable through an active board.
    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>>;
    /// Lists cards of one column in position order.
    fn list_cards(&self, column_id: ColumnId) -> RepoResult<Vec<Card>>;
    /// Applies the recognized fields of `patch`.
    fn update_card(&self, card_id: CardId, patch: &CardPatch) -> RepoResult<Option<Card>>;
    /// Moves one card to a column, appended or inserted at `position`.
    ///
    /// # Contract
    /// - Source and target columns are resequenced under one `BEGIN IMMEDIATE`
    ///   write lock; concurrent writers wait up to the connection busy timeout.
    /// - Both columns stay dense (`0..n`) after commit.
    fn move_card(
        &self,
        card_id: CardId,
        target_column_id: ColumnId,
        position: Option<u32>,
    ) -> RepoResult<Option<Card>>;
    /// Deletes one card.
    fn delete_card(&self, card_id: CardId) -> RepoResult<bool>;

    /// Runs `read` inside one read snapshot.
    ///
    /// `read` must only call read methods; mutations open their own write
    /// transaction and fail inside an open snapshot.
    fn read_snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<T>;
}

/// SQLite-backed hierarchy repository.
pub struct SqliteKanbanRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKanbanRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_kanban_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl HierarchyRepository for SqliteKanbanRepository<'_> {
    fn create_board(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<BoardWithColumns> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;

        tx.execute(
            "INSERT INTO boards (
                external_id,
                name,
                description,
                created_at,
                updated_at,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?4, 1);",
            params![Uuid::new_v4().to_string(), name, description, now],
        )?;
        let board_id = tx.last_insert_rowid();

        for (position, title) in (0_i64..).zip(DEFAULT_COLUMN_TITLES) {
            insert_column_row(&tx, board_id, title, position, now)?;
        }

        let board = load_active_board(&tx, board_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created board {board_id} not found in read-back"))
        })?;
        let columns = list_columns_of(&tx, board_id)?;
        tx.commit()?;

        info!(
            "event=board_create module=repo status=ok board_id={} columns={}",
            board.id,
            columns.len()
        );
        Ok(BoardWithColumns { board, columns })
    }

    fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        load_active_board(self.conn, board_id)
    }

    fn find_board_by_external_id(&self, external_id: ExternalId) -> RepoResult<Option<Board>> {
        let sql = format!("{BOARD_SELECT_SQL} WHERE external_id = ?1 AND is_active = 1;");
        self.conn
            .query_row(&sql, [external_id.to_string()], |row| {
                Ok(parse_board_row(row))
            })
            .optional()?
            .transpose()
    }

    fn list_boards(&self) -> RepoResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOARD_SELECT_SQL} WHERE is_active = 1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut boards = Vec::new();
        while let Some(row) = rows.next()? {
            boards.push(parse_board_row(row)?);
        }
        Ok(boards)
    }

    fn update_board(
        &self,
        board_id: BoardId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> RepoResult<Option<Board>> {
        let tx = self.begin_write()?;
        let changed = tx.execute(
            "UPDATE boards
             SET name = COALESCE(?2, name),
                 description = COALESCE(?3, description),
                 updated_at = ?4
             WHERE id = ?1
               AND is_active = 1;",
            params![
                board_id,
                non_empty(name),
                non_empty(description),
                now_epoch_ms()
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let board = load_active_board(&tx, board_id)?;
        tx.commit()?;
        Ok(board)
    }

    fn delete_board(&self, board_id: BoardId) -> RepoResult<bool> {
        let tx = self.begin_write()?;
        let is_active: Option<bool> = tx
            .query_row(
                "SELECT is_active FROM boards WHERE id = ?1;",
                [board_id],
                |row| row.get(0),
            )
            .optional()?;
        match is_active {
            None => return Ok(false),
            Some(false) => {
                debug!("event=board_delete module=repo status=ok board_id={board_id} mode=noop");
                return Ok(true);
            }
            Some(true) => {}
        }

        tx.execute(
            "UPDATE boards
             SET is_active = 0,
                 updated_at = ?2
             WHERE id = ?1;",
            params![board_id, now_epoch_ms()],
        )?;
        tx.commit()?;

        info!("event=board_delete module=repo status=ok board_id={board_id} mode=soft");
        Ok(true)
    }

    fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        if load_active_board(&tx, board_id)?.is_none() {
            return Ok(None);
        }

        let siblings = Siblings::Columns(board_id);
        let append_at = siblings.count(&tx)?;
        let column_id = insert_column_row(&tx, board_id, title, i64::from(append_at), now)?;
        if position.is_some_and(|target| target < append_at) {
            siblings.place(&tx, column_id, position, now)?;
        }

        let column = load_visible_column(&tx, column_id)?;
        tx.commit()?;
        Ok(column)
    }

    fn get_column(&self, column_id: ColumnId) -> RepoResult<Option<Column>> {
        load_visible_column(self.conn, column_id)
    }

    fn list_columns(&self, board_id: BoardId) -> RepoResult<Vec<Column>> {
        list_columns_of(self.conn, board_id)
    }

    fn update_column(
        &self,
        column_id: ColumnId,
        title: Option<&str>,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        let Some(column) = load_visible_column(&tx, column_id)? else {
            return Ok(None);
        };

        tx.execute(
            "UPDATE columns
             SET title = COALESCE(?2, title),
                 updated_at = ?3
             WHERE id = ?1;",
            params![column_id, non_empty(title), now],
        )?;
        if position.is_some() {
            Siblings::Columns(column.board_id).place(&tx, column_id, position, now)?;
        }

        let updated = load_visible_column(&tx, column_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_column(&self, column_id: ColumnId) -> RepoResult<bool> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        let Some(column) = load_visible_column(&tx, column_id)? else {
            return Ok(false);
        };

        let siblings = Siblings::Columns(column.board_id);
        if siblings.count(&tx)? <= 1 {
            warn!(
                "event=column_delete module=repo status=rejected reason=last_column column_id={} board_id={}",
                column_id, column.board_id
            );
            return Ok(false);
        }

        let removed_cards = tx.execute("DELETE FROM cards WHERE column_id = ?1;", [column_id])?;
        tx.execute("DELETE FROM columns WHERE id = ?1;", [column_id])?;
        siblings.compact(&tx, now)?;
        tx.commit()?;

        info!(
            "event=column_delete module=repo status=ok column_id={} board_id={} removed_cards={}",
            column_id, column.board_id, removed_cards
        );
        Ok(true)
    }

    fn create_card(&self, column_id: ColumnId, card: &NewCard) -> RepoResult<Option<Card>> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        if load_visible_column(&tx, column_id)?.is_none() {
            return Ok(None);
        }

        let position = Siblings::Cards(column_id).count(&tx)?;
        tx.execute(
            "INSERT INTO cards (
                external_id,
                title,
                description,
                assignee,
                due_date,
                priority,
                position,
                column_id,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9);",
            params![
                Uuid::new_v4().to_string(),
                card.title.as_str(),
                card.description.as_deref(),
                card.assignee.as_deref(),
                card.due_date,
                card.priority.as_str(),
                position,
                column_id,
                now,
            ],
        )?;
        let card_id = tx.last_insert_rowid();

        let created = load_visible_card(&tx, card_id)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_card(&self, card_id: CardId) -> RepoResult<Option<Card>> {
        load_visible_card(self.conn, card_id)
    }

    fn list_cards(&self, column_id: ColumnId) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT_SQL}
             WHERE k.column_id = ?1
               AND b.is_active = 1
             ORDER BY k.position ASC, k.id ASC;"
        ))?;
        let mut rows = stmt.query([column_id])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn update_card(&self, card_id: CardId, patch: &CardPatch) -> RepoResult<Option<Card>> {
        let tx = self.begin_write()?;
        if load_visible_card(&tx, card_id)?.is_none() {
            return Ok(None);
        }

        tx.execute(
            "UPDATE cards
             SET title = COALESCE(?2, title),
                 description = COALESCE(?3, description),
                 assignee = COALESCE(?4, assignee),
                 due_date = COALESCE(?5, due_date),
                 priority = COALESCE(?6, priority),
                 updated_at = ?7
             WHERE id = ?1;",
            params![
                card_id,
                patch.title.as_deref(),
                patch.description.as_deref(),
                patch.assignee.as_deref(),
                patch.due_date,
                patch.priority.map(|priority| priority.as_str()),
                now_epoch_ms(),
            ],
        )?;

        let updated = load_visible_card(&tx, card_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn move_card(
        &self,
        card_id: CardId,
        target_column_id: ColumnId,
        position: Option<u32>,
    ) -> RepoResult<Option<Card>> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        let Some(card) = load_visible_card(&tx, card_id)? else {
            return Ok(None);
        };
        if load_visible_column(&tx, target_column_id)?.is_none() {
            return Ok(None);
        }

        let source = Siblings::Cards(card.column_id);
        let target = Siblings::Cards(target_column_id);
        let append_at = if source == target {
            card.position
        } else {
            target.count(&tx)?
        };

        tx.execute(
            "UPDATE cards
             SET column_id = ?2,
                 position = ?3,
                 updated_at = ?4
             WHERE id = ?1;",
            params![card_id, target_column_id, append_at, now],
        )?;
        if source != target {
            source.compact(&tx, now)?;
        }
        target.place(&tx, card_id, position, now)?;

        let moved = load_visible_card(&tx, card_id)?;
        tx.commit()?;

        debug!(
            "event=card_move module=repo status=ok card_id={} from_column={} to_column={}",
            card_id, card.column_id, target_column_id
        );
        Ok(moved)
    }

    fn delete_card(&self, card_id: CardId) -> RepoResult<bool> {
        let now = now_epoch_ms();
        let tx = self.begin_write()?;
        let Some(card) = load_visible_card(&tx, card_id)? else {
            return Ok(false);
        };

        tx.execute("DELETE FROM cards WHERE id = ?1;", [card_id])?;
        Siblings::Cards(card.column_id).compact(&tx, now)?;
        tx.commit()?;
        Ok(true)
    }

    fn read_snapshot<T, F>(&self, read: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let value = read(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn insert_column_row(
    conn: &Connection,
    board_id: BoardId,
    title: &str,
    position: i64,
    now_ms: i64,
) -> RepoResult<ColumnId> {
    conn.execute(
        "INSERT INTO columns (
            external_id,
            title,
            position,
            board_id,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
        params![Uuid::new_v4().to_string(), title, position, board_id, now_ms],
    )?;
    Ok(conn.last_insert_rowid())
}

fn list_columns_of(conn: &Connection, board_id: BoardId) -> RepoResult<Vec<Column>> {
    let mut stmt = conn.prepare(&format!(
        "{COLUMN_SELECT_SQL}
         WHERE c.board_id = ?1
           AND b.is_active = 1
         ORDER BY c.position ASC, c.id ASC;"
    ))?;
    let mut rows = stmt.query([board_id])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(parse_column_row(row)?);
    }
    Ok(columns)
}

/// Treats blank text as "not supplied".
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn ensure_kanban_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "boards",
            &[
                "id",
                "external_id",
                "name",
                "description",
                "created_at",
                "updated_at",
                "is_active",
            ],
        ),
        (
            "columns",
            &[
                "id",
                "external_id",
                "title",
                "position",
                "board_id",
                "created_at",
                "updated_at",
            ],
        ),
        (
            "cards",
            &[
                "id",
                "external_id",
                "title",
                "description",
                "assignee",
                "due_date",
                "priority",
                "position",
                "column_id",
                "created_at",
                "updated_at",
            ],
        ),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
