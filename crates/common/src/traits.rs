//! Core responder trait.
//!
//! Defined in `switchboard-common` so the agents crate, the router and
//! the HTTP layer can all hold `Arc<dyn Agent>` without depending on
//! each other.

use crate::capability::{score, Capability};
use crate::message::ConversationContext;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model quality tier a responder runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Fast utility work: routing, classification
    Utility,
    /// User-facing replies
    Chat,
    /// Best quality, complex reasoning
    Premium,
    /// Domain-specific models
    Specialized,
}

/// Which configuration section a responder's models come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Main,
    Persona,
    Universal,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Main => write!(f, "main"),
            AgentKind::Persona => write!(f, "personas"),
            AgentKind::Universal => write!(f, "universal"),
        }
    }
}

/// Read-only projection of a responder for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub llm_tier: ModelTier,
    pub capabilities: Vec<Capability>,
}

/// A specialised handler that can produce a reply for messages matching
/// its declared capabilities.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique name, also the registry key.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn tier(&self) -> ModelTier;

    fn capabilities(&self) -> &[Capability];

    /// Produce a reply for `message`.
    async fn process(&self, message: &str, context: &ConversationContext) -> Result<String>;

    /// Confidence in `[0, 1]` that this responder fits `message`.
    fn can_handle(&self, message: &str) -> f32 {
        score(message, self.capabilities())
    }

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            llm_tier: self.tier(),
            capabilities: self.capabilities().to_vec(),
        }
    }
}
