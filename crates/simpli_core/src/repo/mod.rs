//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for projects and items.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Service code reaches storage only through these traits.
//! - Repository APIs return semantic errors (`ProjectNotFound`,
//!   `ItemNotFound`) in addition to DB transport errors.

pub mod item_repo;
pub mod project_repo;
pub mod store;
