//! Authentication boundary: identity provider client and session store.
//!
//! # Responsibility
//! - Delegate credential checks to the external identity provider.
//! - Keep authenticated sessions in memory, keyed by cookie value.

pub mod identity;
pub mod session;
