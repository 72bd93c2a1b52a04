//! Placeholder assistant chat.

pub mod chat;
