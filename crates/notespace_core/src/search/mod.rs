//! Workspace search entry points.
//!
//! # Responsibility
//! - Expose the raw case-insensitive substring match over pages.
//! - Leave blank-query policy to callers.

pub mod text;
