//! Page-centric domain model.
//!
//! # Responsibility
//! - Define the page record, the ad-hoc row table and the workspace map.
//! - Keep tree invariants (no dangling children, post-order deletion) inside
//!   pure, storage-agnostic operations.
//!
//! # Invariants
//! - Every page is identified by a stable `PageId` that is never reused.
//! - Every id listed in a `children` vector is a key of the workspace.
//! - The workspace is a forest: a root is any page no other page lists.

pub mod page;
pub mod settings;
pub mod table;
pub mod workspace;
