//! Board and column records.
//!
//! # Invariants
//! - A board owns at least one column while it is active.
//! - Column positions are dense within one board: `0..n`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Internal sequential board identifier used for relations.
pub type BoardId = i64;

/// Internal sequential column identifier used for relations.
pub type ColumnId = i64;

/// Stable public identifier shared by every record kind.
pub type ExternalId = Uuid;

/// Titles of the columns every new board starts with, in position order.
pub const DEFAULT_COLUMN_TITLES: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Top-level container of an ordered list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub external_id: ExternalId,
    pub name: String,
    pub description: Option<String>,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms timestamp of the last successful mutation.
    pub updated_at: i64,
    /// `false` once the board has been soft-deleted.
    pub is_active: bool,
}

/// Ordered container of cards within one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub external_id: ExternalId,
    pub title: String,
    /// Zero-based order key within the owning board.
    pub position: u32,
    pub board_id: BoardId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Board returned from creation together with its default columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardWithColumns {
    pub board: Board,
    /// Columns ordered by position.
    pub columns: Vec<Column>,
}
