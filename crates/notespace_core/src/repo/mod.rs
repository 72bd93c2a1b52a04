//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define load/save contracts for the workspace and the settings.
//! - Isolate JSON file details from service orchestration.
//!
//! # Invariants
//! - `load` never fails: missing or corrupt data degrades to defaults.
//! - `save` replaces persisted state atomically from the caller's view and
//!   reports I/O failures.

pub mod json_file;
pub mod settings_repo;
pub mod workspace_repo;

pub use json_file::{RepoError, RepoResult};
