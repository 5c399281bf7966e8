//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into project/item use-cases.
//! - Publish snapshots that keep UI/FFI layers decoupled from storage.

pub mod config;
pub mod projects_service;
pub mod snapshot;
