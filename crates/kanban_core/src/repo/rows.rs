//! Row mapping between SQLite tables and model records.
//!
//! Read paths reject malformed persisted state (bad UUID text, unknown
//! priority label, negative position) instead of masking it.

use super::hierarchy_repo::{RepoError, RepoResult};
use crate::model::board::{Board, Column};
use crate::model::card::{Card, Priority};
use rusqlite::{Connection, OptionalExtension, Row};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub(super) const BOARD_SELECT_SQL: &str = "SELECT
    id,
    external_id,
    name,
    description,
    created_at,
    updated_at,
    is_active
FROM boards";

// Columns and cards are only visible through an active board.
pub(super) const COLUMN_SELECT_SQL: &str = "SELECT
    c.id AS id,
    c.external_id AS external_id,
    c.title AS title,
    c.position AS position,
    c.board_id AS board_id,
    c.created_at AS created_at,
    c.updated_at AS updated_at
FROM columns c
INNER JOIN boards b ON b.id = c.board_id";

pub(super) const CARD_SELECT_SQL: &str = "SELECT
    k.id AS id,
    k.external_id AS external_id,
    k.title AS title,
    k.description AS description,
    k.assignee AS assignee,
    k.due_date AS due_date,
    k.priority AS priority,
    k.position AS position,
    k.column_id AS column_id,
    k.created_at AS created_at,
    k.updated_at AS updated_at
FROM cards k
INNER JOIN columns c ON c.id = k.column_id
INNER JOIN boards b ON b.id = c.board_id";

/// Current wall-clock time in epoch milliseconds.
pub(super) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub(super) fn load_active_board(conn: &Connection, board_id: i64) -> RepoResult<Option<Board>> {
    let sql = format!("{BOARD_SELECT_SQL} WHERE id = ?1 AND is_active = 1;");
    conn.query_row(&sql, [board_id], |row| Ok(parse_board_row(row)))
        .optional()?
        .transpose()
}

pub(super) fn load_visible_column(
    conn: &Connection,
    column_id: i64,
) -> RepoResult<Option<Column>> {
    let sql = format!("{COLUMN_SELECT_SQL} WHERE c.id = ?1 AND b.is_active = 1;");
    conn.query_row(&sql, [column_id], |row| Ok(parse_column_row(row)))
        .optional()?
        .transpose()
}

pub(super) fn load_visible_card(conn: &Connection, card_id: i64) -> RepoResult<Option<Card>> {
    let sql = format!("{CARD_SELECT_SQL} WHERE k.id = ?1 AND b.is_active = 1;");
    conn.query_row(&sql, [card_id], |row| Ok(parse_card_row(row)))
        .optional()?
        .transpose()
}

pub(super) fn parse_board_row(row: &Row<'_>) -> RepoResult<Board> {
    let external_id: String = row.get("external_id")?;
    let is_active = match row.get::<_, i64>("is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in boards.is_active"
            )));
        }
    };

    Ok(Board {
        id: row.get("id")?,
        external_id: parse_uuid(&external_id, "boards.external_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        is_active,
    })
}

pub(super) fn parse_column_row(row: &Row<'_>) -> RepoResult<Column> {
    let external_id: String = row.get("external_id")?;
    Ok(Column {
        id: row.get("id")?,
        external_id: parse_uuid(&external_id, "columns.external_id")?,
        title: row.get("title")?,
        position: parse_position(row.get("position")?, "columns.position")?,
        board_id: row.get("board_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(super) fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let external_id: String = row.get("external_id")?;
    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in cards.priority"
        ))
    })?;

    Ok(Card {
        id: row.get("id")?,
        external_id: parse_uuid(&external_id, "cards.external_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        assignee: row.get("assignee")?,
        due_date: row.get("due_date")?,
        priority,
        position: parse_position(row.get("position")?, "cards.position")?,
        column_id: row.get("column_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_position(value: i64, column: &'static str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid position `{value}` in {column}")))
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
