//! Core use-case services.
//!
//! # Responsibility
//! - Expose repository operations as the crate's use-case level API.
//! - Keep UI and transport layers decoupled from storage details.

pub mod kanban_service;
