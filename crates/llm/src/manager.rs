use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fallback::{FallbackClient, FallbackReason, FallbackStatus};

/// Failover state across every responder in the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemFallbackStatus {
    pub total_agents: usize,
    pub agents_using_fallback: usize,
    pub agents_status: BTreeMap<String, FallbackStatus>,
}

/// Registry of the [`FallbackClient`]s built at startup, keyed by
/// responder name. Re-registering a name replaces the earlier client.
#[derive(Default)]
pub struct FallbackManager {
    clients: RwLock<BTreeMap<String, Arc<FallbackClient>>>,
}

impl FallbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, client: Arc<FallbackClient>) {
        let name = client.agent_name().to_string();
        self.clients.write().insert(name, client);
    }

    pub fn get(&self, agent_name: &str) -> Option<Arc<FallbackClient>> {
        self.clients.read().get(agent_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    pub fn system_status(&self) -> SystemFallbackStatus {
        let clients = self.clients.read();
        let agents_status: BTreeMap<String, FallbackStatus> = clients
            .iter()
            .map(|(name, client)| (name.clone(), client.status()))
            .collect();
        let agents_using_fallback = agents_status.values().filter(|s| s.using_fallback).count();

        SystemFallbackStatus {
            total_agents: agents_status.len(),
            agents_using_fallback,
            agents_status,
        }
    }

    /// Put every client back on its primary model.
    pub fn reset_all(&self) {
        let clients: Vec<_> = self.clients.read().values().cloned().collect();
        for client in &clients {
            client.reset();
        }
        info!(count = clients.len(), "Reset all agents to primary models");
    }

    /// Force every client that has a fallback model onto it.
    pub fn force_all(&self, reason: FallbackReason) {
        let clients: Vec<_> = self.clients.read().values().cloned().collect();
        for client in &clients {
            client.force_fallback(reason);
        }
        info!(count = clients.len(), reason = %reason, "Forced fallback on all agents");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackSettings, ModelSettings};
    use crate::fallback::ModelEndpoint;
    use crate::mock::ScriptedClient;
    use switchboard_common::AgentKind;

    fn fallback_client(name: &str, with_fallback: bool) -> Arc<FallbackClient> {
        let fallback = with_fallback.then(|| {
            ModelEndpoint::new(
                Arc::new(ScriptedClient::new("f")),
                ModelSettings::new(format!("{name}-fallback")),
            )
        });
        Arc::new(FallbackClient::new(
            name,
            AgentKind::Persona,
            ModelEndpoint::new(
                Arc::new(ScriptedClient::new("p")),
                ModelSettings::new(format!("{name}-primary")),
            ),
            fallback,
            FallbackSettings::default(),
        ))
    }

    #[test]
    fn empty_manager_status() {
        let manager = FallbackManager::new();
        assert!(manager.is_empty());
        let status = manager.system_status();
        assert_eq!(status.total_agents, 0);
        assert_eq!(status.agents_using_fallback, 0);
        assert!(status.agents_status.is_empty());
    }

    #[test]
    fn register_replaces_same_name() {
        let manager = FallbackManager::new();
        manager.register(fallback_client("coding_assistant", false));
        manager.register(fallback_client("coding_assistant", true));
        assert_eq!(manager.len(), 1);

        let status = manager.system_status();
        assert!(status.agents_status["coding_assistant"].fallback_model.is_some());
    }

    #[test]
    fn force_all_skips_clients_without_fallback() {
        let manager = FallbackManager::new();
        manager.register(fallback_client("orchestrator", true));
        manager.register(fallback_client("general_assistant", true));
        manager.register(fallback_client("coding_assistant", false));

        manager.force_all(FallbackReason::ManualOverride);

        let status = manager.system_status();
        assert_eq!(status.total_agents, 3);
        assert_eq!(status.agents_using_fallback, 2);
        assert_eq!(
            status.agents_status["orchestrator"].fallback_reason,
            Some(FallbackReason::ManualOverride)
        );
        assert!(!status.agents_status["coding_assistant"].using_fallback);
    }

    #[test]
    fn reset_all_restores_primaries() {
        let manager = FallbackManager::new();
        let a = fallback_client("a", true);
        let b = fallback_client("b", true);
        manager.register(a.clone());
        manager.register(b.clone());

        a.force_fallback(FallbackReason::CreditExhausted);
        assert_eq!(manager.system_status().agents_using_fallback, 1);

        manager.reset_all();
        assert_eq!(manager.system_status().agents_using_fallback, 0);
        assert!(!b.is_using_fallback());
        let a = manager.get("a").unwrap();
        assert_eq!(a.current_model_name(), "a-primary");
    }

    #[test]
    fn status_serializes() {
        let manager = FallbackManager::new();
        manager.register(fallback_client("main", true));
        let json = serde_json::to_value(manager.system_status()).unwrap();
        assert_eq!(json["total_agents"], 1);
        assert_eq!(json["agents_status"]["main"]["agent_type"], "persona");
    }
}
