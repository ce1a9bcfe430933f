//! Coding assistant - programming help, debugging and architecture advice.

use crate::assistant::{AssistantCore, AssistantProfile};
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_common::{Agent, Capability, ConversationContext, ModelTier, Result};
use switchboard_llm::FallbackClient;
use tracing::{info, warn};

pub const CODING_AGENT_NAME: &str = "coding_assistant";

const CODING_SYSTEM_PROMPT: &str = r#"You are a Senior Software Engineer and Coding Assistant with expertise across multiple programming languages and technologies.

Your specialties:
- Writing clean, efficient, and well-documented code
- Debugging and troubleshooting technical issues
- Explaining programming concepts clearly
- Providing best practices and architectural guidance
- Code reviews and optimization suggestions

Guidelines:
- Always provide working, tested code examples when possible
- Explain your reasoning and approach
- Include comments in code for clarity
- Suggest best practices and potential improvements
- Ask clarifying questions when requirements are unclear
- Consider security, performance, and maintainability

Be practical, precise, and helpful in your responses.
"#;

/// Specialist for programming questions.
pub struct CodingAssistant {
    core: AssistantCore,
}

impl CodingAssistant {
    pub fn new(llm: Arc<FallbackClient>, max_history: usize) -> Self {
        Self {
            core: AssistantCore::new(Self::profile(), llm, max_history),
        }
    }

    pub fn profile() -> AssistantProfile {
        AssistantProfile {
            name: CODING_AGENT_NAME.into(),
            description:
                "Expert programming assistant for code help, debugging, and technical questions"
                    .into(),
            tier: ModelTier::Chat,
            system_prompt: CODING_SYSTEM_PROMPT.into(),
            capabilities: vec![
                Capability::new(
                    "programming",
                    "Help with programming, coding, and software development",
                    [
                        "code",
                        "programming",
                        "python",
                        "javascript",
                        "debug",
                        "function",
                        "class",
                        "algorithm",
                        "bug",
                        "error",
                        "syntax",
                        "api",
                        "framework",
                        "library",
                        "database",
                        "sql",
                        "html",
                        "css",
                        "react",
                        "node",
                    ],
                ),
                Capability::new(
                    "technical_help",
                    "Technical problem solving and architecture advice",
                    [
                        "architecture",
                        "design",
                        "pattern",
                        "best practice",
                        "performance",
                        "optimization",
                        "security",
                        "deployment",
                        "testing",
                        "git",
                        "microservices",
                        "containers",
                        "docker",
                        "kubernetes",
                        "devops",
                        "scalability",
                        "distributed",
                    ],
                ),
            ],
            temperature: Some(0.2),
        }
    }

    pub fn core(&self) -> &AssistantCore {
        &self.core
    }
}

#[async_trait]
impl Agent for CodingAssistant {
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
        info!(
            agent = %self.name(),
            session = %context.session_id,
            "Processing coding request"
        );

        match self
            .core
            .respond(&self.core.profile().system_prompt, message)
            .await
        {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(agent = %self.name(), error = %e, "Coding request failed");
                Ok(format!(
                    "I apologize, but I encountered an error while processing your coding request: {e}"
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_common::AgentKind;
    use switchboard_llm::{FallbackSettings, ModelEndpoint, ModelSettings, ScriptedClient};

    fn assistant(model: ScriptedClient) -> CodingAssistant {
        let llm = Arc::new(FallbackClient::new(
            CODING_AGENT_NAME,
            AgentKind::Persona,
            ModelEndpoint::new(Arc::new(model), ModelSettings::new("openai/gpt-4")),
            None,
            FallbackSettings {
                enabled: false,
                ..Default::default()
            },
        ));
        CodingAssistant::new(llm, 20)
    }

    #[test]
    fn scores_programming_messages() {
        let agent = assistant(ScriptedClient::new("m"));
        // "debug" also contains "bug": four hits cap the group at 1.0
        assert_eq!(agent.can_handle("Can you debug this Python function?"), 1.0);
        let score = agent.can_handle("Write a SQL query");
        assert!((score - 0.3).abs() < 1e-6, "{score}");
        assert_eq!(agent.can_handle("Tell me a joke"), 0.0);
    }

    #[tokio::test]
    async fn model_error_becomes_apology() {
        let agent = assistant(ScriptedClient::new("m").then_fail("502 Bad Gateway"));
        let reply = agent
            .process("fix my code", &ConversationContext::default())
            .await
            .unwrap();
        assert!(reply.starts_with("I apologize, but I encountered an error"));
        assert!(reply.contains("502 Bad Gateway"));
    }

    #[test]
    fn info_reports_chat_tier() {
        let info = assistant(ScriptedClient::new("m")).info();
        assert_eq!(info.name, "coding_assistant");
        assert_eq!(info.llm_tier, ModelTier::Chat);
        assert_eq!(info.capabilities.len(), 2);
    }
}
