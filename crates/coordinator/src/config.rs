//! Configuration for switchboard.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! a working OpenRouter setup. The API key should come from the
//! `OPENROUTER_API_KEY` environment variable rather than the file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use switchboard_common::{AgentKind, ModelTier, Result, SwitchboardError};
use switchboard_llm::{
    build_llm_client, FallbackClient, FallbackManager, FallbackSettings, LlmClient,
    ModelEndpoint, ModelSettings, DEFAULT_BASE_URL, DEFAULT_FALLBACK_MODEL,
};
use tracing::{info, warn};

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Value shipped in sample `.env` files; treated as unset.
const API_KEY_PLACEHOLDER: &str = "your_openrouter_api_key_here";

/// Fallback entry used when a responder has no explicit mapping.
pub const DEFAULT_FALLBACK_NAME: &str = "main_fallback";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    pub api: ApiConfig,
    pub models: ModelsConfig,
    pub routing: RoutingConfig,
    pub fallback: FallbackConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// OpenAI-compatible endpoint root
    pub base_url: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            default_temperature: 0.7,
            default_max_tokens: 1000,
            api_key: None,
        }
    }
}

impl ApiConfig {
    /// Configured key if set, else `OPENROUTER_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| is_real_key(k))
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| is_real_key(k)))
    }
}

fn is_real_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != API_KEY_PLACEHOLDER
}

/// Model id per quality tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierModels {
    pub utility: String,
    pub chat: String,
    pub premium: String,
    pub specialized: String,
}

impl Default for TierModels {
    fn default() -> Self {
        Self {
            utility: "openai/gpt-3.5-turbo".into(),
            chat: "openai/gpt-4".into(),
            premium: "openai/gpt-4-turbo".into(),
            specialized: "openai/gpt-4".into(),
        }
    }
}

impl TierModels {
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Utility => &self.utility,
            ModelTier::Chat => &self.chat,
            ModelTier::Premium => &self.premium,
            ModelTier::Specialized => &self.specialized,
        }
    }
}

/// One configured model. Unset fields inherit from `[api]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// What a persona specialises in; only entries with a description
    /// are offered to the persona router.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelEntry {
    fn persona(description: &str) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub tiers: TierModels,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<ModelEntry>,
    pub personas: BTreeMap<String, ModelEntry>,
    pub universal: BTreeMap<String, ModelEntry>,
    pub fallbacks: BTreeMap<String, ModelEntry>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let personas = [
            ("main", "General conversation, basic questions, greetings"),
            (
                "developer",
                "Software engineering, programming, technical architecture",
            ),
            ("researcher", "Research, analysis, fact-checking, academic work"),
            ("creative", "Creative writing, brainstorming, artistic projects"),
            (
                "business",
                "Business strategy, analysis, planning, professional communication",
            ),
        ]
        .into_iter()
        .map(|(name, description)| (name.to_string(), ModelEntry::persona(description)))
        .collect();

        Self {
            tiers: TierModels::default(),
            main: None,
            personas,
            universal: BTreeMap::new(),
            fallbacks: BTreeMap::new(),
        }
    }
}

/// Which router fronts the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Keyword scoring over the registered responders
    #[default]
    Capability,
    /// Model-classified persona selection
    Persona,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub mode: RoutingMode,
    /// Delegate only when the best score is strictly above this.
    pub confidence_threshold: f32,
    /// Best scores below this are replaced by the default responder.
    pub default_agent_threshold: f32,
    /// Confidence reported for that replacement.
    pub default_agent_confidence: f32,
    /// Persona used when classification fails or is invalid.
    pub main_persona: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mode: RoutingMode::Capability,
            confidence_threshold: 0.4,
            default_agent_threshold: 0.3,
            default_agent_confidence: 0.5,
            main_persona: "main".into(),
        }
    }
}

/// Fallback entry names per responder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    pub personas: BTreeMap<String, String>,
    pub universal: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub notify_on_fallback: bool,
    pub mapping: FallbackMapping,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        let settings = FallbackSettings::default();
        Self {
            enabled: settings.enabled,
            max_retries: settings.max_retries,
            retry_delay_ms: settings.retry_delay_ms,
            notify_on_fallback: settings.notify_on_fallback,
            mapping: FallbackMapping::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Messages each responder keeps in its own history
    pub max_conversation_history: usize,
    /// Turns kept per chat session
    pub max_session_memory: usize,
    pub log_level: String,
    pub log_agent_routing: bool,
    pub log_model_usage: bool,
    /// In-flight requests allowed per model backend
    pub concurrent_requests: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_conversation_history: 20,
            max_session_memory: 20,
            log_level: "INFO".into(),
            log_agent_routing: true,
            log_model_usage: true,
            concurrent_requests: 10,
        }
    }
}

impl SwitchboardConfig {
    /// Load configuration from a TOML file.
    ///
    /// On Unix the file must be a regular file that is not
    /// world-writable, and must not be world-readable if it holds an API
    /// key.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {e}", path.display()))?;

        if config.api.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. Prefer the {API_KEY_ENV} environment variable.",
                path.display()
            );
        }

        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Like [`Self::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    fn entry(&self, name: &str, kind: AgentKind) -> Option<&ModelEntry> {
        if name == "main" || kind == AgentKind::Main {
            return self.models.main.as_ref();
        }
        match kind {
            AgentKind::Persona => self.models.personas.get(name),
            AgentKind::Universal => self.models.universal.get(name),
            AgentKind::Main => None,
        }
    }

    fn settings_from(&self, model: String, entry: Option<&ModelEntry>) -> ModelSettings {
        ModelSettings::new(model)
            .with_temperature(
                entry
                    .and_then(|e| e.temperature)
                    .unwrap_or(self.api.default_temperature),
            )
            .with_max_tokens(
                entry
                    .and_then(|e| e.max_tokens)
                    .unwrap_or(self.api.default_max_tokens),
            )
    }

    /// Primary model for a responder: its own entry, else `[models.main]`,
    /// else the chat tier model.
    pub fn agent_model(&self, name: &str, kind: AgentKind) -> ModelSettings {
        let own = self.entry(name, kind);
        let main = self.models.main.as_ref();

        let model = own
            .and_then(|e| e.model.clone())
            .or_else(|| main.and_then(|e| e.model.clone()))
            .unwrap_or_else(|| self.models.tiers.model_for(ModelTier::Chat).to_string());

        self.settings_from(model, own)
    }

    /// Secondary model for a responder, resolved through
    /// `[fallback.mapping]` and `[models.fallbacks]`.
    pub fn fallback_model(&self, name: &str, kind: AgentKind) -> ModelSettings {
        let mapping = &self.fallback.mapping;
        let mapped = if name == "main" || kind == AgentKind::Main {
            mapping.main.as_deref()
        } else {
            match kind {
                AgentKind::Persona => mapping.personas.get(name).map(String::as_str),
                AgentKind::Universal => mapping.universal.get(name).map(String::as_str),
                AgentKind::Main => None,
            }
        };
        let fallback_name = mapped
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FALLBACK_NAME);

        let entry = self.models.fallbacks.get(fallback_name);
        let model = entry
            .and_then(|e| e.model.clone())
            .unwrap_or_else(|| DEFAULT_FALLBACK_MODEL.to_string());

        self.settings_from(model, entry)
    }

    pub fn fallback_settings(&self) -> FallbackSettings {
        FallbackSettings {
            enabled: self.fallback.enabled,
            max_retries: self.fallback.max_retries,
            retry_delay_ms: self.fallback.retry_delay_ms,
            notify_on_fallback: self.fallback.notify_on_fallback,
        }
    }

    pub fn routing_confidence_threshold(&self) -> f32 {
        self.routing.confidence_threshold
    }

    /// Personas offered to the persona router, with descriptions.
    ///
    /// With no described persona configured, the built-in catalogue is
    /// offered instead.
    pub fn list_personas(&self) -> Vec<(String, String)> {
        let described = |personas: &BTreeMap<String, ModelEntry>| -> Vec<(String, String)> {
            personas
                .iter()
                .filter_map(|(name, entry)| {
                    entry
                        .description
                        .as_ref()
                        .map(|d| (name.clone(), d.clone()))
                })
                .collect()
        };

        let personas = described(&self.models.personas);
        if personas.is_empty() {
            described(&ModelsConfig::default().personas)
        } else {
            personas
        }
    }

    /// Build a responder's [`FallbackClient`] against the configured
    /// OpenAI-compatible endpoint and register it with `manager`.
    pub fn build_invoker(
        &self,
        name: &str,
        kind: AgentKind,
        api_key: Option<String>,
        manager: &FallbackManager,
    ) -> Result<Arc<FallbackClient>> {
        let concurrency = self.system.concurrent_requests;
        self.build_invoker_with(name, kind, manager, |settings| {
            build_llm_client(&self.api.base_url, settings, api_key.clone(), concurrency)
        })
    }

    /// Like [`Self::build_invoker`] with a caller-supplied backend
    /// constructor.
    pub fn build_invoker_with<F>(
        &self,
        name: &str,
        kind: AgentKind,
        manager: &FallbackManager,
        make_client: F,
    ) -> Result<Arc<FallbackClient>>
    where
        F: Fn(&ModelSettings) -> Result<Arc<dyn LlmClient>>,
    {
        let primary_settings = self.agent_model(name, kind);
        if primary_settings.model.trim().is_empty() {
            return Err(SwitchboardError::Config(format!(
                "No model configured for {name}"
            )));
        }
        let primary = ModelEndpoint::new(make_client(&primary_settings)?, primary_settings);

        let fallback = if self.fallback.enabled {
            let settings = self.fallback_model(name, kind);
            Some(ModelEndpoint::new(make_client(&settings)?, settings))
        } else {
            None
        };

        if self.system.log_model_usage {
            info!(
                agent = %name,
                kind = %kind,
                model = %primary.model_name(),
                fallback = fallback.as_ref().map(|f| f.model_name()).unwrap_or("none"),
                "Creating model client"
            );
        }

        let client = Arc::new(FallbackClient::new(
            name,
            kind,
            primary,
            fallback,
            self.fallback_settings(),
        ));
        manager.register(client.clone());
        Ok(client)
    }
}

/// Reject config files other users could tamper with or read secrets
/// from.
#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {e}", path.display()))?;

    if !metadata.is_file() {
        anyhow::bail!("Config path '{}' is not a regular file", path.display());
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {permission_bits:04o}). Fix with: chmod o-w {}",
            path.display(),
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)?;
    let has_api_key = content
        .lines()
        .any(|line| line.trim_start().starts_with("api_key"));

    if has_api_key && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {permission_bits:04o}). Fix with: chmod 600 {}",
            path.display(),
            path.display()
        );
    }

    Ok(())
}
