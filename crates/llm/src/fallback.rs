//! Primary/fallback model invocation with retry and backoff.
//!
//! A [`FallbackClient`] owns one responder's model access. It starts on
//! the primary model and moves to the secondary model when the primary
//! reports exhausted credit or when the retry budget for a single call
//! runs out. It never moves back on its own; [`FallbackClient::reset`]
//! does that.
//!
//! ```text
//!            credit error / retries exhausted
//!  PRIMARY ──────────────────────────────────▶ FALLBACK
//!     ▲                                           │
//!     └───────────────── reset() ─────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use switchboard_common::{AgentKind, Result, SwitchboardError};
use tracing::{debug, error, info, warn};

use crate::classify::{backoff_delay, classify_error, ErrorClass};
use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::config::{FallbackSettings, ModelSettings};

/// Why a client is running on its fallback model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    CreditExhausted,
    MaxRetriesExceeded,
    ManualOverride,
}

impl FallbackReason {
    /// Reason rendered for people, e.g. "credit exhausted".
    pub fn describe(&self) -> &'static str {
        match self {
            FallbackReason::CreditExhausted => "credit exhausted",
            FallbackReason::MaxRetriesExceeded => "max retries exceeded",
            FallbackReason::ManualOverride => "manual override",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            FallbackReason::CreditExhausted => "credit_exhausted",
            FallbackReason::MaxRetriesExceeded => "max_retries_exceeded",
            FallbackReason::ManualOverride => "manual_override",
        };
        f.write_str(tag)
    }
}

/// Which model a client is currently sending to.
///
/// `Fallback` is only ever entered when a fallback endpoint exists, so
/// "using fallback" always comes with a reason and a secondary model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelection {
    Primary,
    Fallback(FallbackReason),
}

/// A backend paired with the generation settings it is called with.
pub struct ModelEndpoint {
    client: Arc<dyn LlmClient>,
    settings: ModelSettings,
}

impl ModelEndpoint {
    pub fn new(client: Arc<dyn LlmClient>, settings: ModelSettings) -> Self {
        Self { client, settings }
    }

    pub fn model_name(&self) -> &str {
        &self.settings.model
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Send `request`, filling in this endpoint's temperature and token
    /// limit where the caller left them unset.
    async fn call(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let mut request = request.clone();
        request.temperature.get_or_insert(self.settings.temperature);
        request.max_tokens.get_or_insert(self.settings.max_tokens);
        self.client.complete(request).await
    }
}

/// Point-in-time view of a [`FallbackClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackStatus {
    pub agent_name: String,
    pub agent_type: AgentKind,
    pub using_fallback: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub primary_model: String,
    pub fallback_model: Option<String>,
    pub fallback_enabled: bool,
}

/// Model access for one responder with automatic failover.
pub struct FallbackClient {
    agent_name: String,
    agent_kind: AgentKind,
    primary: ModelEndpoint,
    fallback: Option<ModelEndpoint>,
    settings: FallbackSettings,
    // Never held across an await. Concurrent calls may race on the
    // transition; last writer wins and either outcome is valid.
    selection: RwLock<ModelSelection>,
}

impl FallbackClient {
    pub fn new(
        agent_name: impl Into<String>,
        agent_kind: AgentKind,
        primary: ModelEndpoint,
        fallback: Option<ModelEndpoint>,
        settings: FallbackSettings,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            agent_kind,
            primary,
            fallback,
            settings,
            selection: RwLock::new(ModelSelection::Primary),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn selection(&self) -> ModelSelection {
        *self.selection.read()
    }

    pub fn is_using_fallback(&self) -> bool {
        matches!(self.selection(), ModelSelection::Fallback(_))
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self.selection() {
            ModelSelection::Primary => None,
            ModelSelection::Fallback(reason) => Some(reason),
        }
    }

    /// Name of the model the next call will go to.
    pub fn current_model_name(&self) -> &str {
        self.active_endpoint().model_name()
    }

    /// Whether replies should carry a "running on fallback" notice.
    pub fn should_notify(&self) -> bool {
        self.is_using_fallback() && self.settings.notify_on_fallback
    }

    pub fn status(&self) -> FallbackStatus {
        let selection = self.selection();
        FallbackStatus {
            agent_name: self.agent_name.clone(),
            agent_type: self.agent_kind,
            using_fallback: matches!(selection, ModelSelection::Fallback(_)),
            fallback_reason: match selection {
                ModelSelection::Primary => None,
                ModelSelection::Fallback(reason) => Some(reason),
            },
            primary_model: self.primary.model_name().to_string(),
            fallback_model: self.fallback.as_ref().map(|f| f.model_name().to_string()),
            fallback_enabled: self.settings.enabled,
        }
    }

    /// Return to the primary model. No-op when already there.
    pub fn reset(&self) {
        let mut selection = self.selection.write();
        if let ModelSelection::Fallback(reason) = *selection {
            info!(
                agent = %self.agent_name,
                previous_reason = %reason,
                "Resetting to primary model"
            );
            *selection = ModelSelection::Primary;
        }
    }

    /// Switch to the fallback model with `reason`. No-op without a
    /// fallback model or when already on it.
    pub fn force_fallback(&self, reason: FallbackReason) {
        if self.fallback.is_none() {
            return;
        }
        let mut selection = self.selection.write();
        if *selection == ModelSelection::Primary {
            info!(agent = %self.agent_name, reason = %reason, "Forcing fallback model");
            *selection = ModelSelection::Fallback(reason);
        }
    }

    fn active_endpoint(&self) -> &ModelEndpoint {
        match (self.selection(), self.fallback.as_ref()) {
            (ModelSelection::Fallback(_), Some(fallback)) => fallback,
            _ => &self.primary,
        }
    }

    /// Move to the fallback model if one exists and is not active yet,
    /// returning it for an immediate call.
    fn transition_to_fallback(&self, reason: FallbackReason) -> Option<&ModelEndpoint> {
        let fallback = self.fallback.as_ref()?;
        let mut selection = self.selection.write();
        if *selection != ModelSelection::Primary {
            return None;
        }
        *selection = ModelSelection::Fallback(reason);
        Some(fallback)
    }

    /// Send `request` to the active model, retrying and failing over
    /// according to the configured policy.
    pub async fn invoke(&self, request: LlmRequest) -> Result<LlmResponse> {
        if !self.settings.enabled {
            return self.primary.call(&request).await;
        }

        let max_retries = self.settings.max_retries;
        let base_delay = self.settings.retry_delay();

        for attempt in 0..=max_retries {
            let endpoint = self.active_endpoint();
            let on_fallback = self.is_using_fallback();

            if on_fallback {
                debug!(
                    agent = %self.agent_name,
                    model = %endpoint.model_name(),
                    "Using fallback model"
                );
            }

            let err = match endpoint.call(&request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let class = classify_error(&err.to_string());
            warn!(
                agent = %self.agent_name,
                model = %endpoint.model_name(),
                attempt = attempt + 1,
                max_retries,
                class = ?class,
                error = %err,
                "Model call failed"
            );

            if class == ErrorClass::Credit || attempt == max_retries {
                let reason = if class == ErrorClass::Credit {
                    FallbackReason::CreditExhausted
                } else {
                    FallbackReason::MaxRetriesExceeded
                };

                let Some(fallback) = self.transition_to_fallback(reason) else {
                    return Err(err);
                };

                warn!(
                    agent = %self.agent_name,
                    reason = %reason,
                    fallback_model = %fallback.model_name(),
                    error = %err,
                    "Switching to fallback model"
                );

                return match fallback.call(&request).await {
                    Ok(response) => {
                        info!(agent = %self.agent_name, "Fallback call succeeded");
                        Ok(response)
                    }
                    Err(fallback_err) => {
                        error!(
                            agent = %self.agent_name,
                            error = %fallback_err,
                            "Fallback model also failed"
                        );
                        Err(fallback_err)
                    }
                };
            }

            let delay = backoff_delay(class, attempt, base_delay);
            debug!(
                agent = %self.agent_name,
                delay_ms = delay.as_millis() as u64,
                "Waiting before retry"
            );
            tokio::time::sleep(delay).await;
        }

        Err(SwitchboardError::AllAttemptsFailed(self.agent_name.clone()))
    }
}

#[async_trait]
impl LlmClient for FallbackClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.invoke(request).await
    }

    fn model_name(&self) -> &str {
        self.current_model_name()
    }
}
