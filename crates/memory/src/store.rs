//! In-process session memory.

use crate::types::{MemoryConfig, Turn};
use std::collections::{HashMap, VecDeque};
use switchboard_common::{ContextTurn, ConversationContext, MessageRole};
use tokio::sync::RwLock;
use tracing::debug;

/// Recent turns per session, oldest evicted first once a session holds
/// `max_session_memory` turns.
pub struct SessionStore {
    config: MemoryConfig,
    sessions: RwLock<HashMap<String, VecDeque<Turn>>>,
}

impl SessionStore {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Record a turn for `session_id` and return it.
    pub async fn append(
        &self,
        session_id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Turn {
        let turn = Turn::new(role, content);
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push_back(turn.clone());

        while turns.len() > self.config.max_session_memory {
            if let Some(evicted) = turns.pop_front() {
                debug!(session = %session_id, turn_id = %evicted.id, "Evicted from session memory");
            }
        }

        turn
    }

    /// Turns of `session_id`, oldest first. Unknown sessions are empty.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Build the context a responder sees for the next message.
    pub async fn context(&self, session_id: &str) -> ConversationContext {
        let history = self
            .history(session_id)
            .await
            .iter()
            .map(ContextTurn::from)
            .collect();
        ConversationContext::new(session_id).with_history(history)
    }

    /// Forget a session. Returns whether it existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}
