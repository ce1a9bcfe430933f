//! Model access for switchboard.
//!
//! Responders never talk to a provider directly. Each one holds a
//! [`FallbackClient`] that wraps a primary and an optional secondary
//! [`LlmClient`] and handles retry, backoff and failover. The
//! [`FallbackManager`] sees all of them for status and bulk control.

pub mod classify;
pub mod client;
pub mod config;
pub mod fallback;
pub mod manager;
pub mod mock;
pub mod openai;

pub use classify::{backoff_delay, classify_error, ErrorClass};
pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{
    build_llm_client, FallbackSettings, ModelSettings, SemaphoredClient, DEFAULT_BASE_URL,
    DEFAULT_FALLBACK_MODEL,
};
pub use fallback::{FallbackClient, FallbackReason, FallbackStatus, ModelEndpoint, ModelSelection};
pub use manager::{FallbackManager, SystemFallbackStatus};
pub use mock::ScriptedClient;
pub use openai::OpenAiClient;
