//! Repository layer for the kanban hierarchy.
//!
//! # Responsibility
//! - Define the hierarchy data access contract used by services.
//! - Isolate SQLite query details, row mapping and position bookkeeping.
//!
//! # Invariants
//! - Not-found and invariant refusals are return values, not errors.
//! - Storage errors propagate unchanged; nothing here retries.

pub mod hierarchy_repo;
mod positions;
mod rows;
