//! Kanban use-case service.
//!
//! # Responsibility
//! - Provide the public entry points callers (UI, CLI, transport layers) use.
//! - Forward each call 1:1 to the hierarchy repository or view assembler.
//!
//! # Invariants
//! - Service APIs never bypass repository transactions or invariants.
//! - Service layer remains storage-agnostic.

use crate::model::board::{Board, BoardId, BoardWithColumns, Column, ColumnId, ExternalId};
use crate::model::card::{Card, CardId, CardPatch, NewCard};
use crate::repo::hierarchy_repo::{HierarchyRepository, RepoResult};
use crate::view::board_view::{assemble_board_view, BoardView};

/// Use-case service wrapper over a hierarchy repository.
pub struct KanbanService<R: HierarchyRepository> {
    repo: R,
}

impl<R: HierarchyRepository> KanbanService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a board with the default "To Do", "In Progress" and "Done" columns.
    pub fn create_board(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> RepoResult<BoardWithColumns> {
        self.repo.create_board(name, description)
    }

    /// Gets one active board.
    pub fn get_board(&self, board_id: BoardId) -> RepoResult<Option<Board>> {
        self.repo.get_board(board_id)
    }

    /// Gets one active board by its public identifier.
    pub fn find_board_by_external_id(&self, external_id: ExternalId) -> RepoResult<Option<Board>> {
        self.repo.find_board_by_external_id(external_id)
    }

    /// Lists all active boards.
    pub fn list_boards(&self) -> RepoResult<Vec<Board>> {
        self.repo.list_boards()
    }

    /// Renames or re-describes one active board.
    ///
    /// # Contract
    /// - Blank strings count as "not supplied".
    /// - Returns `None` for a missing or soft-deleted board.
    pub fn update_board(
        &self,
        board_id: BoardId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> RepoResult<Option<Board>> {
        self.repo.update_board(board_id, name, description)
    }

    /// Soft-deletes one board.
    ///
    /// # Contract
    /// - Returns `false` only for an unknown id; repeated calls return `true`.
    pub fn delete_board(&self, board_id: BoardId) -> RepoResult<bool> {
        self.repo.delete_board(board_id)
    }

    /// Creates one column in an active board.
    ///
    /// # Contract
    /// - `None` position appends; `Some(index)` inserts, clamped to the
    ///   column count, and shifts later columns.
    /// - Positions are assigned under the repository write lock.
    /// - Returns `None` for a missing or soft-deleted board.
    pub fn create_column(
        &self,
        board_id: BoardId,
        title: &str,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>> {
        self.repo.create_column(board_id, title, position)
    }

    /// Renames and/or reorders one column within its board.
    ///
    /// # Contract
    /// - A supplied position is clamped and sibling columns stay dense.
    /// - Returns `None` when the column is not reachable.
    pub fn update_column(
        &self,
        column_id: ColumnId,
        title: Option<&str>,
        position: Option<u32>,
    ) -> RepoResult<Option<Column>> {
        self.repo.update_column(column_id, title, position)
    }

    /// Deletes one column and its cards.
    ///
    /// Returns `false` for a missing column and for a board's last column.
    pub fn delete_column(&self, column_id: ColumnId) -> RepoResult<bool> {
        self.repo.delete_column(column_id)
    }

    /// Appends one card to the end of a column.
    ///
    /// # Contract
    /// - The position equals the column's card count at commit time.
    /// - Returns `None` when the column is not reachable.
    pub fn create_card(&self, column_id: ColumnId, card: &NewCard) -> RepoResult<Option<Card>> {
        self.repo.create_card(column_id, card)
    }

    /// Applies the recognized fields of `patch`; see [`CardPatch::from_json`].
    pub fn update_card(&self, card_id: CardId, patch: &CardPatch) -> RepoResult<Option<Card>> {
        self.repo.update_card(card_id, patch)
    }

    /// Moves one card; `None` position appends to the target column.
    pub fn move_card(
        &self,
        card_id: CardId,
        target_column_id: ColumnId,
        position: Option<u32>,
    ) -> RepoResult<Option<Card>> {
        self.repo.move_card(card_id, target_column_id, position)
    }

    /// Deletes one card and closes the gap in its column.
    pub fn delete_card(&self, card_id: CardId) -> RepoResult<bool> {
        self.repo.delete_card(card_id)
    }

    /// Builds the nested board view from one consistent snapshot.
    pub fn get_board_with_data(&self, board_id: BoardId) -> RepoResult<Option<BoardView>> {
        assemble_board_view(&self.repo, board_id)
    }
}
