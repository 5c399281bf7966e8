//! Item domain model.
//!
//! # Responsibility
//! - Define the persisted item record and its priority scale.
//! - Provide the default shape used by "add item".
//!
//! # Invariants
//! - `project_id` always points at an existing project.
//! - Priority is persisted as `0..=2`; other values are invalid data.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an item.
pub type ItemId = Uuid;

/// Title assigned to items created through the service.
pub const DEFAULT_ITEM_TITLE: &str = "New Item";

/// Three-step item priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPriority {
    Low,
    Medium,
    High,
}

impl ItemPriority {
    pub const ALL: [ItemPriority; 3] = [ItemPriority::Low, ItemPriority::Medium, ItemPriority::High];

    /// Integer stored in `items.priority`.
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Parses the stored integer form.
    pub fn from_raw(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            _ => None,
        }
    }

    /// Star label shown next to item titles.
    pub fn stars(self) -> &'static str {
        match self {
            Self::Low => "⭐️",
            Self::Medium => "⭐️⭐️",
            Self::High => "⭐️⭐️⭐️",
        }
    }
}

/// Persisted item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub project_id: ProjectId,
    pub title: String,
    pub completed: bool,
    pub priority: ItemPriority,
    /// Unix epoch milliseconds of the last completion change made via edit.
    pub completion_date: Option<i64>,
}

impl Item {
    /// Creates an incomplete item with the default title and a fresh ID.
    pub fn new_default(project_id: ProjectId, priority: ItemPriority) -> Self {
        Self::with_id(Uuid::new_v4(), project_id, DEFAULT_ITEM_TITLE, priority)
    }

    /// Creates an incomplete item with a caller-provided ID.
    pub fn with_id(
        id: ItemId,
        project_id: ProjectId,
        title: impl Into<String>,
        priority: ItemPriority,
    ) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            completed: false,
            priority,
            completion_date: None,
        }
    }
}
