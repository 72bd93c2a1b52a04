//! Echo assistant and in-memory chat history.
//!
//! The assistant does not call any model; it answers with an echo tagged by
//! the chosen model so the surrounding flow can be exercised end to end.

use serde::Serialize;

/// Author of one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Builds the assistant reply for `prompt`.
///
/// A blank `model` falls back to `default_model`.
pub fn reply(model: Option<&str>, default_model: &str, prompt: &str) -> String {
    let chosen = model
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default_model);
    format!("[Model: {chosen}] You said: {prompt}")
}

/// Conversation kept for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `prompt`, produces the reply, records it and returns it.
    pub fn ask(&mut self, model: Option<&str>, default_model: &str, prompt: &str) -> String {
        let answer = reply(model, default_model, prompt);
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: prompt.to_string(),
        });
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            text: answer.clone(),
        });
        answer
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
