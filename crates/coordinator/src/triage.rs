//! Capability-scored router.
//!
//! The coordinator asks the registry which responder fits a message
//! best. Confident matches are delegated; everything else is answered
//! by the coordinator's own model with a prompt listing the
//! specialists.

use crate::config::SwitchboardConfig;
use crate::registry::AgentRegistry;
use crate::routing::{RoutedReply, Router, APOLOGY};
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_agents::{AssistantCore, AssistantProfile, DEFAULT_MAX_HISTORY};
use switchboard_common::{Agent, Capability, ConversationContext, ModelTier, Result};
use switchboard_llm::FallbackClient;
use tracing::{debug, error, info};

pub const ORCHESTRATOR_NAME: &str = "orchestrator";

/// Name the coordinator's model client is configured and tracked under.
pub const ORCHESTRATOR_INVOKER: &str = "main";

const ORCHESTRATOR_SYSTEM_PROMPT: &str = r#"You are the Orchestrator Agent, responsible for routing user requests to the most appropriate specialist agent.

Your role:
1. Analyze user messages to understand their intent and domain
2. Route to the best specialist agent based on capabilities
3. If no specialist is suitable, handle general queries yourself
4. Provide helpful responses while maintaining context

Available specialist agents and their capabilities:
{agent_capabilities}

Guidelines:
- Be concise and helpful
- Route to specialists when their expertise is clearly needed
- Handle simple greetings and general questions yourself
- Maintain conversation context across interactions"#;

/// Router tuning shared by both routers.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Delegate only when the best score is strictly above this.
    pub confidence_threshold: f32,
    pub max_history: usize,
    /// Emit an `info!` line per routing decision.
    pub log_routing: bool,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            max_history: DEFAULT_MAX_HISTORY,
            log_routing: true,
        }
    }
}

impl CoordinatorSettings {
    pub fn from_config(config: &SwitchboardConfig) -> Self {
        Self {
            confidence_threshold: config.routing_confidence_threshold(),
            max_history: config.system.max_conversation_history,
            log_routing: config.system.log_agent_routing,
        }
    }
}

/// The main router.
pub struct Coordinator {
    core: AssistantCore,
    registry: Arc<AgentRegistry>,
    settings: CoordinatorSettings,
}

impl Coordinator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        llm: Arc<FallbackClient>,
        settings: CoordinatorSettings,
    ) -> Self {
        info!(
            agents = registry.len(),
            threshold = settings.confidence_threshold,
            "Initializing coordinator"
        );

        Self {
            core: AssistantCore::new(Self::profile(), llm, settings.max_history),
            registry,
            settings,
        }
    }

    pub fn profile() -> AssistantProfile {
        AssistantProfile {
            name: ORCHESTRATOR_NAME.into(),
            description: "Main agent that routes requests to specialized assistants".into(),
            tier: ModelTier::Utility,
            system_prompt: ORCHESTRATOR_SYSTEM_PROMPT.into(),
            capabilities: vec![Capability::new(
                "routing",
                "Route user requests to appropriate specialist agents",
                ["help", "question", "need", "want", "how", "what", "why"],
            )],
            temperature: Some(0.3),
        }
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn core(&self) -> &AssistantCore {
        &self.core
    }

    /// Route and return only the reply text.
    pub async fn route(&self, message: &str, context: &ConversationContext) -> String {
        self.route_detailed(message, context).await.reply
    }

    fn system_prompt(&self) -> String {
        let capabilities: Vec<String> = self
            .registry
            .capabilities_summary()
            .into_iter()
            .filter(|(name, _)| name != ORCHESTRATOR_NAME)
            .map(|(name, keywords)| format!("- {name}: {}", keywords.join(", ")))
            .collect();

        let listing = if capabilities.is_empty() {
            "No specialist agents currently available".to_string()
        } else {
            capabilities.join("\n")
        };

        self.core
            .profile()
            .system_prompt
            .replace("{agent_capabilities}", &listing)
    }

    async fn handle_directly(&self, message: &str) -> RoutedReply {
        if self.settings.log_routing {
            info!("Handling directly by orchestrator");
        }

        match self.core.respond(&self.system_prompt(), message).await {
            Ok(reply) => RoutedReply::direct(ORCHESTRATOR_NAME, reply),
            Err(e) => {
                error!(error = %e, "Orchestrator direct handling failed");
                RoutedReply::direct(ORCHESTRATOR_NAME, APOLOGY)
            }
        }
    }
}

#[async_trait]
impl Router for Coordinator {
    fn name(&self) -> &str {
        ORCHESTRATOR_NAME
    }

    async fn route_detailed(&self, message: &str, context: &ConversationContext) -> RoutedReply {
        let (candidate, confidence) = self.registry.find_best(message);

        debug!(
            candidate = candidate.as_ref().map(|a| a.name()).unwrap_or("none"),
            confidence,
            "Best agent found"
        );

        let Some(agent) = candidate
            .filter(|a| a.name() != ORCHESTRATOR_NAME)
            .filter(|_| confidence > self.settings.confidence_threshold)
        else {
            return self.handle_directly(message).await;
        };

        if self.settings.log_routing {
            info!(agent = %agent.name(), confidence, "Routing to specialist");
        }

        match agent.process(message, context).await {
            Ok(reply) => {
                let routed = RoutedReply::delegated(agent.name(), agent.name(), &reply, confidence);
                self.core.remember(message, &routed.reply);
                routed
            }
            Err(e) => {
                error!(agent = %agent.name(), error = %e, "Delegation failed, handling directly");
                self.handle_directly(message).await
            }
        }
    }

    fn invoker(&self) -> &Arc<FallbackClient> {
        self.core.llm()
    }
}

#[async_trait]
impl Agent for Coordinator {
    fn name(&self) -> &str {
        ORCHESTRATOR_NAME
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
        Ok(self.route(message, context).await)
    }
}
