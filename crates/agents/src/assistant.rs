//! Shared plumbing for model-backed responders.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use switchboard_common::{Capability, ModelTier, Result};
use switchboard_llm::{ChatMessage, FallbackClient, LlmRequest};
use tracing::debug;

/// Messages kept per responder unless configured otherwise.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Static description of a responder.
#[derive(Debug, Clone)]
pub struct AssistantProfile {
    pub name: String,
    pub description: String,
    pub tier: ModelTier,
    pub system_prompt: String,
    pub capabilities: Vec<Capability>,
    /// Sampling temperature sent with every request. `None` defers to
    /// the model endpoint's configured value.
    pub temperature: Option<f32>,
}

/// Profile, model access and rolling conversation history.
///
/// History holds individual messages, not exchanges; once it exceeds
/// `max_history` the oldest messages are dropped.
pub struct AssistantCore {
    profile: AssistantProfile,
    llm: Arc<FallbackClient>,
    history: Mutex<VecDeque<ChatMessage>>,
    max_history: usize,
}

impl AssistantCore {
    pub fn new(profile: AssistantProfile, llm: Arc<FallbackClient>, max_history: usize) -> Self {
        Self {
            profile,
            llm,
            history: Mutex::new(VecDeque::new()),
            max_history,
        }
    }

    pub fn profile(&self) -> &AssistantProfile {
        &self.profile
    }

    pub fn llm(&self) -> &Arc<FallbackClient> {
        &self.llm
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Ask the model with `system_prompt`, the stored history and
    /// `message`. On success the exchange is remembered and the trimmed
    /// reply returned; on failure history is left untouched.
    pub async fn respond(&self, system_prompt: &str, message: &str) -> Result<String> {
        let request = self.build_request(system_prompt, message);

        debug!(
            agent = %self.profile.name,
            history = request.messages.len() - 1,
            "Invoking model"
        );

        let response = self.llm.invoke(request).await?;
        let reply = response.content.trim().to_string();
        self.remember(message, &reply);
        Ok(reply)
    }

    /// Ask the model a one-off question that neither reads nor writes
    /// history.
    pub async fn ask(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let mut request = LlmRequest::new(system_prompt, vec![ChatMessage::user(prompt)]);
        request.temperature = self.profile.temperature;
        let response = self.llm.invoke(request).await?;
        Ok(response.content.trim().to_string())
    }

    /// Append an exchange to history, evicting the oldest messages.
    pub fn remember(&self, user_message: &str, reply: &str) {
        let mut history = self.history.lock();
        history.push_back(ChatMessage::user(user_message));
        history.push_back(ChatMessage::assistant(reply));
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    fn build_request(&self, system_prompt: &str, message: &str) -> LlmRequest {
        let mut messages: Vec<ChatMessage> = self.history.lock().iter().cloned().collect();
        messages.push(ChatMessage::user(message));

        let mut request = LlmRequest::new(system_prompt, messages);
        request.temperature = self.profile.temperature;
        request
    }
}
