//! Project domain model.
//!
//! # Responsibility
//! - Define the persisted project record.
//! - Provide the default shape used by "add project".
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `date_created` is set once and never mutated.

use crate::model::color::{ProjectColor, Rgba};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Title assigned to projects created through the service.
pub const DEFAULT_PROJECT_TITLE: &str = "New Project";

/// Persisted project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub color: Rgba,
    /// User-controlled open/closed flag. Has no effect on items.
    pub closed: bool,
    /// Unix epoch milliseconds.
    pub date_created: i64,
}

impl Project {
    /// Creates a project with default title/color and a fresh ID.
    pub fn new_default(now_epoch_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), DEFAULT_PROJECT_TITLE, now_epoch_ms)
    }

    /// Creates a project with a caller-provided ID.
    pub fn with_id(id: ProjectId, title: impl Into<String>, now_epoch_ms: i64) -> Self {
        Self {
            id,
            title: title.into(),
            color: ProjectColor::DEFAULT.rgba(),
            closed: false,
            date_created: now_epoch_ms,
        }
    }
}
