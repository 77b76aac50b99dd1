//! Nested board read model: board -> ordered columns -> ordered cards.
//!
//! # Responsibility
//! - Assemble the display view from the three flat hierarchy tables.
//!
//! # Invariants
//! - All reads for one view run inside a single repository snapshot.
//! - Columns and cards appear in ascending position order.
//! - Card priority serializes as its lowercase label.

use crate::model::board::{Board, BoardId, Column, ColumnId, ExternalId};
use crate::model::card::{Card, CardId, Priority};
use crate::repo::hierarchy_repo::{HierarchyRepository, RepoResult};
use serde::Serialize;

/// Board with its columns and cards materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub id: BoardId,
    pub uuid: ExternalId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub is_active: bool,
    pub columns: Vec<ColumnView>,
}

/// One column of a [`BoardView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub uuid: ExternalId,
    pub title: String,
    pub position: u32,
    pub cards: Vec<CardView>,
}

/// One card of a [`ColumnView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub uuid: ExternalId,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Priority,
    pub position: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl BoardView {
    /// Finds a column view by internal id.
    pub fn column(&self, column_id: ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.id == column_id)
    }
}

/// Builds the nested view of one active board.
///
/// Returns `Ok(None)` when the board is missing or soft-deleted.
pub fn assemble_board_view<R: HierarchyRepository>(
    repo: &R,
    board_id: BoardId,
) -> RepoResult<Option<BoardView>> {
    repo.read_snapshot(|repo| {
        let Some(board) = repo.get_board(board_id)? else {
            return Ok(None);
        };

        let columns = repo
            .list_columns(board_id)?
            .into_iter()
            .map(|column| {
                let cards = repo.list_cards(column.id)?;
                Ok(column_view(column, cards))
            })
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Some(board_view(board, columns)))
    })
}

fn board_view(board: Board, columns: Vec<ColumnView>) -> BoardView {
    BoardView {
        id: board.id,
        uuid: board.external_id,
        name: board.name,
        description: board.description,
        created_at: board.created_at,
        updated_at: board.updated_at,
        is_active: board.is_active,
        columns,
    }
}

fn column_view(column: Column, cards: Vec<Card>) -> ColumnView {
    ColumnView {
        id: column.id,
        uuid: column.external_id,
        title: column.title,
        position: column.position,
        cards: cards.into_iter().map(card_view).collect(),
    }
}

fn card_view(card: Card) -> CardView {
    CardView {
        id: card.id,
        uuid: card.external_id,
        title: card.title,
        description: card.description,
        assignee: card.assignee,
        due_date: card.due_date,
        priority: card.priority,
        position: card.position,
        created_at: card.created_at,
        updated_at: card.updated_at,
    }
}
