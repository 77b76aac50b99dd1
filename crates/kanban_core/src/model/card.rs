//! Card record, priority levels and card input shapes.
//!
//! # Invariants
//! - Priority is persisted and serialized as its lowercase label.
//! - `CardPatch` ignores keys it does not recognize; `null` means "not supplied".

use crate::model::board::{ColumnId, ExternalId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Internal sequential card identifier used for relations.
pub type CardId = i64;

/// Card urgency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Returns the canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a canonical lowercase label.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaf task item inside one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub external_id: ExternalId,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    pub priority: Priority,
    /// Zero-based order key within the owning column.
    pub position: u32,
    pub column_id: ColumnId,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating one card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Priority,
}

impl NewCard {
    /// Creates card input with only a title and `Priority::Medium`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial card update.
///
/// Deserializing from an arbitrary key/value object keeps only the
/// recognized keys below. Position and column changes go through
/// `move_card`, so `position` and `column_id` keys are ignored here too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub priority: Option<Priority>,
}

impl CardPatch {
    /// Builds a patch from a JSON object, dropping unrecognized keys.
    ///
    /// # Errors
    /// - Returns an error when a recognized key carries a value of the wrong
    ///   type (for example an unknown priority label).
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Returns `true` when no field would be applied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}
