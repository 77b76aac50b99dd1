//! Core domain logic for kanban boards.
//! This crate is the single source of truth for board/column/card invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use config::{ConfigError, DatabaseConfig, StorageBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    Board, BoardId, BoardWithColumns, Column, ColumnId, ExternalId, DEFAULT_COLUMN_TITLES,
};
pub use model::card::{Card, CardId, CardPatch, NewCard, Priority};
pub use repo::hierarchy_repo::{
    HierarchyRepository, RepoError, RepoResult, SqliteKanbanRepository,
};
pub use service::kanban_service::KanbanService;
pub use view::board_view::{assemble_board_view, BoardView, CardView, ColumnView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
