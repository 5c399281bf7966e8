//! Domain model for projects and their items.
//!
//! # Responsibility
//! - Define canonical records persisted by the store.
//! - Own default values applied when records are created.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Every item references exactly one project.

pub mod color;
pub mod item;
pub mod project;
