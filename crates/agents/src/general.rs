//! General assistant - conversation and broad questions.
//!
//! Registered as the default responder: it answers whatever no
//! specialist claims with enough confidence.

use crate::assistant::{AssistantCore, AssistantProfile};
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_common::{Agent, Capability, ConversationContext, ModelTier, Result};
use switchboard_llm::FallbackClient;
use tracing::{info, warn};

pub const GENERAL_AGENT_NAME: &str = "general_assistant";

const GENERAL_SYSTEM_PROMPT: &str = r#"You are a helpful, knowledgeable, and friendly general assistant.

Your role:
- Provide helpful information and answers on a wide range of topics
- Engage in natural, friendly conversation
- Be informative yet concise
- Ask clarifying questions when needed
- Admit when you don't know something
- Suggest when a specialist might be more helpful

Keep responses focused and relevant, and use clear, easy-to-understand language.
"#;

pub struct GeneralAssistant {
    core: AssistantCore,
}

impl GeneralAssistant {
    pub fn new(llm: Arc<FallbackClient>, max_history: usize) -> Self {
        Self {
            core: AssistantCore::new(Self::profile(), llm, max_history),
        }
    }

    pub fn profile() -> AssistantProfile {
        AssistantProfile {
            name: GENERAL_AGENT_NAME.into(),
            description: "Helpful general assistant for various topics and conversations".into(),
            tier: ModelTier::Utility,
            system_prompt: GENERAL_SYSTEM_PROMPT.into(),
            capabilities: vec![
                Capability::new(
                    "general_help",
                    "General assistance, conversation, and information",
                    [
                        "hello", "hi", "help", "question", "explain", "tell", "what", "how", "why",
                        "when", "where", "general", "chat", "talk",
                    ],
                ),
                Capability::new(
                    "information",
                    "Provide information and answer questions on various topics",
                    [
                        "information",
                        "facts",
                        "explain",
                        "definition",
                        "meaning",
                        "history",
                        "science",
                        "news",
                        "weather",
                        "calculate",
                    ],
                ),
            ],
            temperature: None,
        }
    }

    pub fn core(&self) -> &AssistantCore {
        &self.core
    }
}

#[async_trait]
impl Agent for GeneralAssistant {
    fn name(&self) -> &str {
        &self.core.profile().name
    }

    fn description(&self) -> &str {
        &self.core.profile().description
    }

    fn tier(&self) -> ModelTier {
        self.core.profile().tier
    }

    fn capabilities(&self) -> &[Capability] {
        &self.core.profile().capabilities
    }

    async fn process(&self, message: &str, context: &ConversationContext) -> Result<String> {
        info!(agent = %self.name(), session = %context.session_id, "Processing general request");

        self.core
            .respond(&self.core.profile().system_prompt, message)
            .await
            .or_else(|e| {
                warn!(agent = %self.name(), error = %e, "General request failed");
                Ok(format!(
                    "I apologize, but I encountered an error while processing your request: {e}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_common::AgentKind;
    use switchboard_llm::{FallbackSettings, ModelEndpoint, ModelSettings, ScriptedClient};

    fn assistant(model: ScriptedClient) -> GeneralAssistant {
        let llm = Arc::new(FallbackClient::new(
            GENERAL_AGENT_NAME,
            AgentKind::Persona,
            ModelEndpoint::new(Arc::new(model), ModelSettings::new("openai/gpt-3.5-turbo")),
            None,
            FallbackSettings::default(),
        ));
        GeneralAssistant::new(llm, 20)
    }

    #[test]
    fn greeting_scores_low() {
        let agent = assistant(ScriptedClient::new("m"));
        let score = agent.can_handle("hi");
        assert!((score - 0.3).abs() < 1e-6, "{score}");
    }

    #[test]
    fn explain_counts_in_both_groups() {
        let agent = assistant(ScriptedClient::new("m"));
        // "explain" sits in both groups
        let score = agent.can_handle("explain");
        assert!((score - 0.6).abs() < 1e-6, "{score}");
    }

    #[tokio::test]
    async fn replies_through_model() {
        let agent = assistant(ScriptedClient::new("m").then_reply("Hello! How can I help?"));
        let reply = agent
            .process("hello", &ConversationContext::default())
            .await
            .unwrap();
        assert_eq!(reply, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn model_error_becomes_apology() {
        let agent = assistant(ScriptedClient::new("m").then_fail("insufficient credits"));
        let reply = agent
            .process("hello", &ConversationContext::default())
            .await
            .unwrap();
        assert!(reply.contains("insufficient credits"));
    }
}
