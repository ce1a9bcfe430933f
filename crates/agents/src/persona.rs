//! Configurable persona responders (main, developer, researcher, ...).

use crate::assistant::{AssistantCore, AssistantProfile};
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_common::{Agent, Capability, ConversationContext, ModelTier, Result};
use switchboard_llm::FallbackClient;
use tracing::info;

/// A responder defined entirely by configuration: a name and a
/// description of what it specialises in.
///
/// Unlike the built-in assistants, model failures are returned to the
/// caller so a persona router can fall back to answering itself.
pub struct PersonaAgent {
    core: AssistantCore,
}

impl PersonaAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        llm: Arc<FallbackClient>,
        max_history: usize,
    ) -> Self {
        let name = name.into();
        let description = description.into();
        let system_prompt = persona_prompt(&name, &description);

        Self {
            core: AssistantCore::new(
                AssistantProfile {
                    name,
                    description,
                    tier: ModelTier::Chat,
                    system_prompt,
                    capabilities: Vec::new(),
                    temperature: None,
                },
                llm,
                max_history,
            ),
        }
    }

    pub fn core(&self) -> &AssistantCore {
        &self.core
    }
}

fn persona_prompt(name: &str, description: &str) -> String {
    format!(
        "You are the {name} persona.\n\nYour specialisation: {description}\n\n\
         Stay within your specialisation, be accurate and concise, and say so \
         when a request falls outside it."
    )
}

#[async_trait]
impl Agent for PersonaAgent {
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
        info!(persona = %self.name(), session = %context.session_id, "Persona handling request");
        self.core
            .respond(&self.core.profile().system_prompt, message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_common::AgentKind;
    use switchboard_llm::{FallbackSettings, ModelEndpoint, ModelSettings, ScriptedClient};

    fn persona(model: Arc<ScriptedClient>) -> PersonaAgent {
        let llm = Arc::new(FallbackClient::new(
            "developer",
            AgentKind::Persona,
            ModelEndpoint::new(model, ModelSettings::new("anthropic/claude-3-sonnet")),
            None,
            FallbackSettings {
                enabled: false,
                ..Default::default()
            },
        ));
        PersonaAgent::new(
            "developer",
            "Software engineering, programming, technical architecture",
            llm,
            20,
        )
    }

    #[tokio::test]
    async fn prompt_names_persona() {
        let model = Arc::new(ScriptedClient::new("m"));
        let agent = persona(model.clone());
        agent
            .process("design a cache", &ConversationContext::default())
            .await
            .unwrap();

        let prompt = model.requests()[0].system_prompt.clone().unwrap_or_default();
        assert!(prompt.contains("developer persona"));
        assert!(prompt.contains("technical architecture"));
    }

    #[tokio::test]
    async fn errors_propagate() {
        let agent = persona(Arc::new(ScriptedClient::new("m").then_fail("503 Service Unavailable")));
        let err = agent
            .process("hi", &ConversationContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn personas_never_claim_by_keyword() {
        let agent = persona(Arc::new(ScriptedClient::new("m")));
        assert_eq!(agent.can_handle("write some python code"), 0.0);
    }
}
