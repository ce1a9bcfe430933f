use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use switchboard_common::{Result, SwitchboardError};

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::openai::OpenAiClient;

/// Model used when a fallback mapping names nothing usable.
pub const DEFAULT_FALLBACK_MODEL: &str = "meta-llama/llama-3.2-3b-instruct:free";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// One model endpoint's generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

impl ModelSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Process-wide failover policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Append a notice to replies produced while on the fallback model.
    #[serde(default = "default_enabled")]
    pub notify_on_fallback: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            notify_on_fallback: default_enabled(),
        }
    }
}

impl FallbackSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Caps the number of in-flight requests to one backend.
pub struct SemaphoredClient {
    inner: Arc<dyn LlmClient>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent.max(1))),
        }
    }
}

#[async_trait]
impl LlmClient for SemaphoredClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| SwitchboardError::Agent(format!("Semaphore acquire failed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build an OpenAI-compatible backend for `model`, limited to
/// `max_concurrent` simultaneous requests.
pub fn build_llm_client(
    base_url: &str,
    model: &ModelSettings,
    api_key: Option<String>,
    max_concurrent: usize,
) -> Result<Arc<dyn LlmClient>> {
    if model.model.trim().is_empty() {
        return Err(SwitchboardError::Config(
            "Model name must not be empty".to_string(),
        ));
    }

    let base: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        Some(base_url.to_string()),
        model.model.clone(),
        api_key,
    ));

    Ok(Arc::new(SemaphoredClient::new(base, max_concurrent)))
}
