//! Core domain logic for Simpli.
//! This crate owns the project/item model, its SQLite store and the
//! service that every UI surface goes through.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::color::{decode_color, encode_color, ColorError, ProjectColor, Rgba};
pub use model::item::{Item, ItemId, ItemPriority, DEFAULT_ITEM_TITLE};
pub use model::project::{Project, ProjectId, DEFAULT_PROJECT_TITLE};
pub use repo::item_repo::ItemRepository;
pub use repo::project_repo::ProjectRepository;
pub use repo::store::{RepoError, RepoResult, SqliteStore, WorkingContext};
pub use service::config::{PriorityPolicy, ServiceConfig, DEFAULT_HOT_ITEMS_LIMIT};
pub use service::projects_service::{
    completion_status, now_epoch_ms, HotItem, ProjectOverview, ProjectsService, ServiceError,
    ServiceResult,
};
pub use service::snapshot::{SnapshotChannel, SubscriptionId};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
