//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Own the locks that serialize mutations of shared state.

pub mod page_service;
pub mod settings_service;
