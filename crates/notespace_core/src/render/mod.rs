//! Page content rendering.
//!
//! # Responsibility
//! - Turn raw page content into safe display markup.
//! - Keep rendering pure: no state survives a call.

pub mod content;
