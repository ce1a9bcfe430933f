//! Scripted model backend for tests.
//!
//! Downstream crates drive the router and responders through this
//! instead of a live provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use switchboard_common::{Result, SwitchboardError};

use crate::client::{LlmClient, LlmRequest, LlmResponse};

/// Backend that replays a fixed script of replies and failures.
///
/// Each call pops the next scripted outcome; once the script is empty it
/// keeps answering with the fallback reply.
pub struct ScriptedClient {
    model: String,
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback_reply: std::result::Result<String, String>,
    requests: Mutex<Vec<LlmRequest>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            fallback_reply: Ok(format!("reply from {model}")),
            model,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful reply.
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(content.into()));
        self
    }

    /// Queue a failure with the given provider message.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(Err(message.into()));
        self
    }

    /// Answer every unscripted call with this reply.
    pub fn always_reply(mut self, content: impl Into<String>) -> Self {
        self.fallback_reply = Ok(content.into());
        self
    }

    /// Fail every unscripted call with this message.
    pub fn always_fail(mut self, message: impl Into<String>) -> Self {
        self.fallback_reply = Err(message.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback_reply.clone());

        match outcome {
            Ok(content) => Ok(LlmResponse {
                content,
                model: self.model.clone(),
                usage: None,
                finish_reason: Some("stop".to_string()),
            }),
            Err(message) => Err(SwitchboardError::Model(message)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
