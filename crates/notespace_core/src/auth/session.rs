//! In-memory session store.
//!
//! Sessions bind an opaque cookie value to the principal returned by the
//! identity provider. They live only as long as the process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Opaque session identifier carried by the session cookie.
pub type SessionId = Uuid;

/// Name of the cookie that carries the session id.
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Authenticated principal bound to one session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Process-local session map.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `session` under a fresh id and returns the id.
    pub fn create(&self, session: Session) -> SessionId {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let candidate = Uuid::new_v4();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        sessions.insert(id, session);
        id
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Looks up a session from a raw cookie value; malformed values miss.
    pub fn get_by_cookie(&self, cookie_value: &str) -> Option<Session> {
        let id = Uuid::parse_str(cookie_value.trim()).ok()?;
        self.get(id)
    }

    /// Removes one session. Returns whether it existed.
    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
