//! Memory types and configuration.

use serde::{Deserialize, Serialize};
use switchboard_common::{ContextTurn, MessageRole};
use uuid::Uuid;

/// One stored exchange half of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique ID
    pub id: Uuid,

    pub role: MessageRole,

    pub content: String,

    /// Creation timestamp (Unix millis)
    pub created_at: u64,
}

impl Turn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<&Turn> for ContextTurn {
    fn from(turn: &Turn) -> Self {
        ContextTurn {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Configuration for the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum turns kept per session
    #[serde(default = "default_max_session_memory")]
    pub max_session_memory: usize,
}

fn default_max_session_memory() -> usize {
    20
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_session_memory: default_max_session_memory(),
        }
    }
}
