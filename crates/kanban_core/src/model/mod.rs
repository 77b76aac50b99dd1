//! Kanban domain model.
//!
//! # Responsibility
//! - Define the plain records for boards, columns and cards.
//! - Keep records free of storage handles; repositories return owned values.
//!
//! # Invariants
//! - Every record carries an internal sequential `id` and a stable
//!   `external_id` that never changes after creation.
//! - `position` values are zero-based and scoped to the parent record.

pub mod board;
pub mod card;
