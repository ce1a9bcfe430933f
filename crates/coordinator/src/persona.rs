//! Persona-selecting router.
//!
//! Instead of keyword scores, this router asks its model which persona
//! from a closed catalogue should answer. Anything outside the
//! catalogue, or a failed classification, selects the main persona.

use crate::registry::DEFAULT_OVERRIDE_CONFIDENCE;
use crate::routing::{RoutedReply, Router, APOLOGY};
use crate::triage::CoordinatorSettings;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use switchboard_agents::{AssistantCore, AssistantProfile};
use switchboard_common::{Agent, Capability, ConversationContext, ModelTier, Result};
use switchboard_llm::FallbackClient;
use tracing::{error, info, warn};

pub const PERSONA_ROUTER_NAME: &str = "top_level_orchestrator";

/// Name the persona router's model client is configured and tracked under.
pub const PERSONA_ROUTER_INVOKER: &str = "top_level";

const SELECTOR_SYSTEM_PROMPT: &str =
    "You are an expert at analyzing user requests and selecting the appropriate specialist.";

/// Routes each message to one persona chosen by the model.
pub struct PersonaCoordinator {
    core: AssistantCore,
    catalog: Vec<(String, String)>,
    personas: BTreeMap<String, Arc<dyn Agent>>,
    main_persona: String,
    settings: CoordinatorSettings,
}

impl PersonaCoordinator {
    /// `catalog` lists the selectable personas with their descriptions.
    pub fn new(
        llm: Arc<FallbackClient>,
        catalog: Vec<(String, String)>,
        main_persona: impl Into<String>,
        settings: CoordinatorSettings,
    ) -> Self {
        let profile = Self::profile(&catalog);
        Self {
            core: AssistantCore::new(profile, llm, settings.max_history),
            catalog,
            personas: BTreeMap::new(),
            main_persona: main_persona.into(),
            settings,
        }
    }

    fn profile(catalog: &[(String, String)]) -> AssistantProfile {
        AssistantProfile {
            name: PERSONA_ROUTER_NAME.into(),
            description: "Top-level agent that routes requests to specialized personas".into(),
            tier: ModelTier::Premium,
            system_prompt: direct_prompt(catalog),
            capabilities: vec![Capability::new(
                "persona_routing",
                "Route user requests to appropriate persona agents",
                ["help", "question", "need", "want", "how", "what", "why"],
            )],
            temperature: Some(0.3),
        }
    }

    pub fn register_persona(&mut self, persona: Arc<dyn Agent>) {
        let name = persona.name().to_string();
        info!(persona = %name, "Registered persona");
        self.personas.insert(name, persona);
    }

    pub fn persona_names(&self) -> Vec<String> {
        self.catalog.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn core(&self) -> &AssistantCore {
        &self.core
    }

    /// Ask the model for a persona. Returns the persona and whether the
    /// model's answer was used (rather than the main persona default).
    pub async fn select_persona(&self, message: &str) -> (String, bool) {
        let prompt = classification_prompt(message, &self.catalog);

        let answer = match self.core.ask(SELECTOR_SYSTEM_PROMPT, &prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "Persona selection failed");
                return (self.main_persona.clone(), false);
            }
        };

        let selected = answer
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
            .to_lowercase();

        if self.catalog.iter().any(|(name, _)| *name == selected) {
            (selected, true)
        } else {
            warn!(answer = %answer, "Invalid persona selected, defaulting to main");
            (self.main_persona.clone(), false)
        }
    }

    pub async fn route(&self, message: &str, context: &ConversationContext) -> String {
        self.route_detailed(message, context).await.reply
    }

    async fn handle_directly(&self, message: &str) -> RoutedReply {
        if self.settings.log_routing {
            info!("Handling directly by top-level orchestrator");
        }

        let system_prompt = self.core.profile().system_prompt.clone();
        match self.core.respond(&system_prompt, message).await {
            Ok(reply) => RoutedReply::direct(PERSONA_ROUTER_NAME, reply),
            Err(e) => {
                error!(error = %e, "Top-level direct handling failed");
                RoutedReply::direct(PERSONA_ROUTER_NAME, APOLOGY)
            }
        }
    }
}

fn catalog_listing(catalog: &[(String, String)]) -> String {
    catalog
        .iter()
        .map(|(name, description)| format!("- {name}: {description}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn direct_prompt(catalog: &[(String, String)]) -> String {
    format!(
        "You are the Top-Level Orchestrator, responsible for routing user requests to the most \
         appropriate specialized persona.\n\n\
         Available personas:\n{}\n\n\
         Guidelines:\n\
         - Route to specialists when their expertise is clearly needed\n\
         - Handle simple greetings and very basic questions yourself\n\
         - Maintain conversation context across interactions",
        catalog_listing(catalog)
    )
}

fn classification_prompt(message: &str, catalog: &[(String, String)]) -> String {
    let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
    format!(
        "Analyze this user message and select the most appropriate persona to handle it.\n\n\
         User message: \"{message}\"\n\n\
         Available personas:\n{}\n\n\
         Consider the domain and complexity of the request and the specific expertise needed.\n\n\
         Respond with just the persona name ({}) that would best handle this request.",
        catalog_listing(catalog),
        names.join(", ")
    )
}

#[async_trait]
impl Router for PersonaCoordinator {
    fn name(&self) -> &str {
        PERSONA_ROUTER_NAME
    }

    async fn route_detailed(&self, message: &str, context: &ConversationContext) -> RoutedReply {
        let (selected, classified) = self.select_persona(message).await;

        let Some(persona) = self.personas.get(&selected) else {
            warn!(persona = %selected, "Selected persona is not registered");
            return self.handle_directly(message).await;
        };

        if self.settings.log_routing {
            info!(persona = %selected, classified, "Routing to persona");
        }

        let confidence = if classified {
            1.0
        } else {
            DEFAULT_OVERRIDE_CONFIDENCE
        };

        match persona.process(message, context).await {
            Ok(reply) => {
                let marker = format!("{selected} persona");
                let routed = RoutedReply::delegated(&selected, &marker, &reply, confidence);
                self.core.remember(message, &routed.reply);
                routed
            }
            Err(e) => {
                error!(persona = %selected, error = %e, "Persona failed, handling directly");
                self.handle_directly(message).await
            }
        }
    }

    fn invoker(&self) -> &Arc<FallbackClient> {
        self.core.llm()
    }
}

#[async_trait]
impl Agent for PersonaCoordinator {
    fn name(&self) -> &str {
        PERSONA_ROUTER_NAME
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
