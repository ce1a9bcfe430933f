//! Integration tests for routing with real responders.
//!
//! Model clients are built from configuration with scripted backends, so
//! these exercise the same wiring the server uses without a provider.

use std::sync::Arc;

use switchboard_agents::{
    CodingAssistant, GeneralAssistant, PersonaAgent, CODING_AGENT_NAME, GENERAL_AGENT_NAME,
};
use switchboard_common::{Agent, AgentKind, ConversationContext};
use switchboard_coordinator::{
    AgentRegistry, Coordinator, CoordinatorSettings, PersonaCoordinator, Router,
    SwitchboardConfig, ORCHESTRATOR_INVOKER, ORCHESTRATOR_NAME, PERSONA_ROUTER_INVOKER,
};
use switchboard_llm::{
    FallbackClient, FallbackManager, FallbackReason, LlmClient, ScriptedClient,
    DEFAULT_FALLBACK_MODEL,
};

/// Build an invoker whose primary and fallback are the given scripts.
fn invoker(
    config: &SwitchboardConfig,
    manager: &FallbackManager,
    name: &str,
    kind: AgentKind,
    primary: Arc<ScriptedClient>,
    fallback: Arc<ScriptedClient>,
) -> Arc<FallbackClient> {
    config
        .build_invoker_with(name, kind, manager, |settings| {
            let client: Arc<dyn LlmClient> = if settings.model == DEFAULT_FALLBACK_MODEL {
                fallback.clone()
            } else {
                primary.clone()
            };
            Ok(client)
        })
        .unwrap()
}

struct Harness {
    coordinator: Coordinator,
    manager: FallbackManager,
    orchestrator_model: Arc<ScriptedClient>,
    coding_model: Arc<ScriptedClient>,
    coding_fallback: Arc<ScriptedClient>,
    general_model: Arc<ScriptedClient>,
}

fn harness(coding_model: ScriptedClient) -> Harness {
    let mut config = SwitchboardConfig::default();
    config.fallback.retry_delay_ms = 1;

    let manager = FallbackManager::new();
    let orchestrator_model = Arc::new(ScriptedClient::new("main"));
    let coding_model = Arc::new(coding_model);
    let coding_fallback = Arc::new(ScriptedClient::new("coding-fallback"));
    let general_model = Arc::new(ScriptedClient::new("general"));
    let spare = Arc::new(ScriptedClient::new("spare"));

    let coding = CodingAssistant::new(
        invoker(
            &config,
            &manager,
            CODING_AGENT_NAME,
            AgentKind::Persona,
            coding_model.clone(),
            coding_fallback.clone(),
        ),
        20,
    );
    let general = GeneralAssistant::new(
        invoker(
            &config,
            &manager,
            GENERAL_AGENT_NAME,
            AgentKind::Persona,
            general_model.clone(),
            spare.clone(),
        ),
        20,
    );

    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(coding), false);
    registry.register(Arc::new(general), true);

    let coordinator = Coordinator::new(
        Arc::new(registry),
        invoker(
            &config,
            &manager,
            ORCHESTRATOR_INVOKER,
            AgentKind::Main,
            orchestrator_model.clone(),
            spare,
        ),
        CoordinatorSettings::from_config(&config),
    );

    Harness {
        coordinator,
        manager,
        orchestrator_model,
        coding_model,
        coding_fallback,
        general_model,
    }
}

// ============================================================================
// Capability routing
// ============================================================================

#[tokio::test]
async fn test_coding_question_is_delegated() {
    let h = harness(ScriptedClient::new("coding").then_reply("Add a base case."));

    let routed = h
        .coordinator
        .route_detailed(
            "Can you debug this Python function?",
            &ConversationContext::default(),
        )
        .await;

    assert_eq!(routed.agent_used, CODING_AGENT_NAME);
    assert_eq!(routed.reply, "[Routed to coding_assistant]\n\nAdd a base case.");
    assert_eq!(routed.confidence, 1.0);
    assert_eq!(h.orchestrator_model.calls(), 0);
}

#[tokio::test]
async fn test_greeting_is_answered_by_orchestrator() {
    let h = harness(ScriptedClient::new("coding"));

    // "hello" alone scores 0.3 for the general assistant: not above 0.4
    let routed = h
        .coordinator
        .route_detailed("Hello there", &ConversationContext::default())
        .await;

    assert_eq!(routed.agent_used, ORCHESTRATOR_NAME);
    assert!(!routed.delegated);
    assert_eq!(routed.reply, "reply from main");
    assert_eq!(h.general_model.calls(), 0);

    let system_prompt = h.orchestrator_model.requests()[0]
        .system_prompt
        .clone()
        .unwrap();
    assert!(system_prompt.contains("- coding_assistant: code, programming"));
    assert!(system_prompt.contains("- general_assistant: hello"));
}

#[tokio::test]
async fn test_unmatched_message_goes_to_default_responder() {
    let h = harness(ScriptedClient::new("coding"));

    let routed = h
        .coordinator
        .route_detailed("Bonjour", &ConversationContext::default())
        .await;

    assert_eq!(routed.agent_used, GENERAL_AGENT_NAME);
    assert_eq!(routed.confidence, 0.5);
    assert!(routed.reply.starts_with("[Routed to general_assistant]"));
}

#[tokio::test]
async fn test_delegated_exchange_is_remembered_by_both() {
    let h = harness(ScriptedClient::new("coding").then_reply("Use a Vec."));

    h.coordinator
        .route("Debug this function", &ConversationContext::default())
        .await;

    let history = h.coordinator.core().history();
    assert_eq!(history.len(), 2);
    assert!(history[1].content.starts_with("[Routed to coding_assistant]"));

    let coding = h.coordinator.registry().get(CODING_AGENT_NAME).unwrap();
    assert_eq!(coding.name(), CODING_AGENT_NAME);
}

// ============================================================================
// Failover through routing
// ============================================================================

#[tokio::test]
async fn test_credit_exhaustion_switches_specialist_to_fallback() {
    let h = harness(ScriptedClient::new("coding").always_fail("Insufficient credits"));

    let routed = h
        .coordinator
        .route_detailed("Fix this syntax error", &ConversationContext::default())
        .await;

    assert_eq!(routed.agent_used, CODING_AGENT_NAME);
    assert!(routed.reply.ends_with("reply from coding-fallback"));
    assert_eq!(h.coding_model.calls(), 1);

    let status = h.manager.system_status();
    assert_eq!(status.total_agents, 3);
    assert_eq!(status.agents_using_fallback, 1);

    let coding = &status.agents_status[CODING_AGENT_NAME];
    assert!(coding.using_fallback);
    assert_eq!(coding.fallback_reason, Some(FallbackReason::CreditExhausted));

    // Sticky: the next request goes straight to the fallback
    h.coordinator
        .route("another syntax error", &ConversationContext::default())
        .await;
    assert_eq!(h.coding_model.calls(), 1);
    assert_eq!(h.coding_fallback.calls(), 2);
}

#[tokio::test]
async fn test_reset_all_returns_to_primary() {
    let h = harness(
        ScriptedClient::new("coding")
            .then_fail("402 Payment Required")
            .then_reply("Back on primary."),
    );

    h.coordinator
        .route("debug my code", &ConversationContext::default())
        .await;
    assert_eq!(h.manager.system_status().agents_using_fallback, 1);

    h.manager.reset_all();
    let reply = h
        .coordinator
        .route("debug my code again", &ConversationContext::default())
        .await;

    assert!(reply.ends_with("Back on primary."));
    assert_eq!(h.manager.system_status().agents_using_fallback, 0);
}

// ============================================================================
// Persona routing
// ============================================================================

#[tokio::test]
async fn test_persona_router_uses_configured_catalogue() {
    let config = SwitchboardConfig::default();
    let manager = FallbackManager::new();
    let spare = Arc::new(ScriptedClient::new("spare"));
    let selector = Arc::new(ScriptedClient::new("top").then_reply("researcher"));

    let mut router = PersonaCoordinator::new(
        invoker(
            &config,
            &manager,
            PERSONA_ROUTER_INVOKER,
            AgentKind::Persona,
            selector,
            spare.clone(),
        ),
        config.list_personas(),
        config.routing.main_persona.clone(),
        CoordinatorSettings::from_config(&config),
    );

    let mut researcher_model = None;
    for (name, description) in config.list_personas() {
        let model = Arc::new(ScriptedClient::new(format!("{name}-model")));
        if name == "researcher" {
            researcher_model = Some(model.clone());
        }
        let llm = invoker(&config, &manager, &name, AgentKind::Persona, model, spare.clone());
        router.register_persona(Arc::new(PersonaAgent::new(
            name.as_str(),
            description.as_str(),
            llm,
            20,
        )));
    }

    let routed = router
        .route_detailed(
            "Compare the evidence on intermittent fasting",
            &ConversationContext::default(),
        )
        .await;

    assert_eq!(routed.agent_used, "researcher");
    assert_eq!(
        routed.reply,
        "[Routed to researcher persona]\n\nreply from researcher-model"
    );
    assert_eq!(researcher_model.unwrap().calls(), 1);
    assert_eq!(manager.len(), 6);
}
