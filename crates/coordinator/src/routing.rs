//! Routing outcomes shared by both routers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use switchboard_common::ConversationContext;
use switchboard_llm::FallbackClient;

/// Reply given when a router cannot produce anything better.
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

/// The result of routing one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedReply {
    /// Final reply text, including any routing marker
    pub reply: String,

    /// Responder that produced the reply
    pub agent_used: String,

    /// Confidence (0.0 - 1.0) behind the routing choice
    pub confidence: f32,

    /// Whether a specialist answered rather than the router itself
    pub delegated: bool,
}

impl RoutedReply {
    pub fn direct(router: &str, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            agent_used: router.to_string(),
            confidence: 1.0,
            delegated: false,
        }
    }

    pub fn delegated(agent: &str, marker: &str, reply: &str, confidence: f32) -> Self {
        Self {
            reply: format!("[Routed to {marker}]\n\n{reply}"),
            agent_used: agent.to_string(),
            confidence,
            delegated: true,
        }
    }
}

/// Front door for chat messages.
#[async_trait]
pub trait Router: Send + Sync {
    fn name(&self) -> &str;

    /// Route `message` and always come back with text.
    async fn route_detailed(&self, message: &str, context: &ConversationContext) -> RoutedReply;

    /// The router's own model access, used for direct answers.
    fn invoker(&self) -> &Arc<FallbackClient>;
}
