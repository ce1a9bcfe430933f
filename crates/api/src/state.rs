//! Application state for the API server.

use std::sync::Arc;

use switchboard_agents::{
    CodingAssistant, GeneralAssistant, PersonaAgent, CODING_AGENT_NAME, GENERAL_AGENT_NAME,
};
use switchboard_common::{Agent, AgentKind, Result};
use switchboard_coordinator::{
    AgentRegistry, Coordinator, CoordinatorSettings, PersonaCoordinator, Router, RoutingMode,
    SwitchboardConfig, ORCHESTRATOR_INVOKER, PERSONA_ROUTER_INVOKER,
};
use switchboard_llm::{FallbackClient, FallbackManager, LlmClient, ModelSettings};
use switchboard_memory::{MemoryConfig, SessionStore};
use tracing::info;

/// Shared application state for the API server.
pub struct AppState {
    /// Front door for chat messages
    pub router: Arc<dyn Router>,

    /// Responders listed by `/api/agents`
    pub registry: Arc<AgentRegistry>,

    /// Every model client, for the fallback endpoints
    pub manager: Arc<FallbackManager>,

    /// Per-session chat turns
    pub sessions: SessionStore,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        router: Arc<dyn Router>,
        registry: Arc<AgentRegistry>,
        manager: Arc<FallbackManager>,
        memory: MemoryConfig,
    ) -> Self {
        Self {
            router,
            registry,
            manager,
            sessions: SessionStore::new(memory),
            start_time: std::time::Instant::now(),
        }
    }

    /// Wire every responder and the router against the configured
    /// provider.
    pub fn from_config(config: &SwitchboardConfig, api_key: Option<String>) -> Result<Self> {
        let manager = Arc::new(FallbackManager::new());
        let build = |name: &str, kind: AgentKind| {
            config.build_invoker(name, kind, api_key.clone(), &manager)
        };
        Self::assemble(config, manager.clone(), build)
    }

    /// Like [`Self::from_config`] with a caller-supplied backend
    /// constructor.
    pub fn from_config_with<F>(config: &SwitchboardConfig, make_client: F) -> Result<Self>
    where
        F: Fn(&ModelSettings) -> Result<Arc<dyn LlmClient>>,
    {
        let manager = Arc::new(FallbackManager::new());
        let build = |name: &str, kind: AgentKind| {
            config.build_invoker_with(name, kind, &manager, &make_client)
        };
        Self::assemble(config, manager.clone(), build)
    }

    fn assemble<B>(
        config: &SwitchboardConfig,
        manager: Arc<FallbackManager>,
        build: B,
    ) -> Result<Self>
    where
        B: Fn(&str, AgentKind) -> Result<Arc<FallbackClient>>,
    {
        let settings = CoordinatorSettings::from_config(config);
        let max_history = settings.max_history;
        let mut registry = AgentRegistry::new().with_default_override(
            config.routing.default_agent_threshold,
            config.routing.default_agent_confidence,
        );

        let (router, registry) = match config.routing.mode {
            RoutingMode::Capability => {
                let coding = CodingAssistant::new(
                    build(CODING_AGENT_NAME, AgentKind::Persona)?,
                    max_history,
                );
                let general = GeneralAssistant::new(
                    build(GENERAL_AGENT_NAME, AgentKind::Persona)?,
                    max_history,
                );
                registry.register(Arc::new(coding), false);
                registry.register(Arc::new(general), true);

                let registry = Arc::new(registry);
                let coordinator = Coordinator::new(
                    registry.clone(),
                    build(ORCHESTRATOR_INVOKER, AgentKind::Main)?,
                    settings,
                );
                (Arc::new(coordinator) as Arc<dyn Router>, registry)
            }
            RoutingMode::Persona => {
                let catalog = config.list_personas();
                let mut router = PersonaCoordinator::new(
                    build(PERSONA_ROUTER_INVOKER, AgentKind::Persona)?,
                    catalog.clone(),
                    config.routing.main_persona.clone(),
                    settings,
                );
                for (name, description) in catalog {
                    let persona: Arc<dyn Agent> = Arc::new(PersonaAgent::new(
                        name.as_str(),
                        description,
                        build(&name, AgentKind::Persona)?,
                        max_history,
                    ));
                    router.register_persona(persona.clone());
                    registry.register(persona, false);
                }
                (Arc::new(router) as Arc<dyn Router>, Arc::new(registry))
            }
        };

        info!(
            mode = ?config.routing.mode,
            router = router.name(),
            agents = registry.len(),
            "Agent system initialized"
        );

        Ok(Self::new(
            router,
            registry,
            manager,
            MemoryConfig {
                max_session_memory: config.system.max_session_memory,
            },
        ))
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
