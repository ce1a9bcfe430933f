//! Responder registry and best-match lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use switchboard_common::{Agent, AgentInfo};
use tracing::info;

/// Best scores below this are replaced by the default responder.
pub const DEFAULT_OVERRIDE_THRESHOLD: f32 = 0.3;

/// Confidence reported when the default responder is substituted.
pub const DEFAULT_OVERRIDE_CONFIDENCE: f32 = 0.5;

/// Registered responders in registration order, plus an optional
/// default that answers when nothing else scores well enough.
///
/// Built once at startup and then shared read-only.
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
    default_agent: Option<String>,
    override_threshold: f32,
    override_confidence: f32,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            default_agent: None,
            override_threshold: DEFAULT_OVERRIDE_THRESHOLD,
            override_confidence: DEFAULT_OVERRIDE_CONFIDENCE,
        }
    }

    /// Change when and how the default responder is substituted.
    pub fn with_default_override(mut self, threshold: f32, confidence: f32) -> Self {
        self.override_threshold = threshold;
        self.override_confidence = confidence;
        self
    }

    /// Add `agent`, replacing any responder of the same name in place.
    pub fn register(&mut self, agent: Arc<dyn Agent>, is_default: bool) {
        let name = agent.name().to_string();

        match self.agents.iter_mut().find(|a| a.name() == name) {
            Some(slot) => *slot = agent,
            None => self.agents.push(agent),
        }

        if is_default {
            self.default_agent = Some(name.clone());
        }

        info!(agent = %name, is_default, "Registered agent");
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.name() == name).cloned()
    }

    pub fn default_agent(&self) -> Option<Arc<dyn Agent>> {
        self.default_agent.as_deref().and_then(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Highest-scoring responder for `message` and its confidence.
    ///
    /// Ties go to the earliest registered. When the best score is below
    /// the override threshold and a default exists, the default is
    /// returned with the fixed override confidence instead.
    pub fn find_best(&self, message: &str) -> (Option<Arc<dyn Agent>>, f32) {
        let mut best: Option<&Arc<dyn Agent>> = None;
        let mut best_score = 0.0_f32;

        for agent in &self.agents {
            let score = agent.can_handle(message);
            if score > best_score {
                best_score = score;
                best = Some(agent);
            }
        }

        if best_score < self.override_threshold {
            if let Some(default) = self.default_agent() {
                return (Some(default), self.override_confidence);
            }
        }

        (best.cloned().or_else(|| self.default_agent()), best_score)
    }

    pub fn list(&self) -> Vec<AgentInfo> {
        self.agents.iter().map(|a| a.info()).collect()
    }

    /// Every responder's keywords, flattened in capability order.
    pub fn capabilities_summary(&self) -> BTreeMap<String, Vec<String>> {
        self.agents
            .iter()
            .map(|agent| {
                let keywords = agent
                    .capabilities()
                    .iter()
                    .flat_map(|c| c.keywords.iter().cloned())
                    .collect();
                (agent.name().to_string(), keywords)
            })
            .collect()
    }
}
