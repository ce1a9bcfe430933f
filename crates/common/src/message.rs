//! Conversation context handed to responders.

use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One prior turn of a session, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub role: MessageRole,
    pub content: String,
}

/// Per-request context: which session the message belongs to and what
/// the session memory held before it arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: String,

    #[serde(default)]
    pub history: Vec<ContextTurn>,
}

impl ConversationContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ContextTurn>) -> Self {
        self.history = history;
        self
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_named_default() {
        let ctx = ConversationContext::default();
        assert_eq!(ctx.session_id, "default");
        assert!(ctx.history.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn history_defaults_when_missing() {
        let ctx: ConversationContext = serde_json::from_str(r#"{"session_id": "abc"}"#).unwrap();
        assert_eq!(ctx.session_id, "abc");
        assert!(ctx.history.is_empty());
    }
}
