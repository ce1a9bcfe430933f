//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use switchboard_common::{AgentInfo, MessageRole};
use switchboard_coordinator::Router;
use switchboard_llm::{FallbackReason, SystemFallbackStatus};
use tracing::{debug, info};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub router: String,
    pub agents: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        router: state.router.name().to_string(),
        agents: state.registry.len(),
    })
}

fn default_session() -> String {
    "default".to_string()
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "sessionId", default = "default_session")]
    pub session_id: String,
}

/// Chat response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub agent_used: String,
    pub confidence: f32,
    pub using_fallback: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub current_model: String,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    fn bad_request(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Notice appended to replies while the router runs on its fallback.
pub fn fallback_notice(model: &str, reason: FallbackReason) -> String {
    format!(
        "\n\n⚠️ Note: Currently using fallback model ({model}) due to {}.",
        reason.describe()
    )
}

/// Route a chat message and record the exchange in its session.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    if request.message.trim().is_empty() {
        return Err(ErrorResponse::bad_request(
            "Message must not be empty",
            "EMPTY_MESSAGE",
        ));
    }

    info!(
        session = %request.session_id,
        content_preview = %request.message.chars().take(50).collect::<String>(),
        "Received message"
    );

    let context = state.sessions.context(&request.session_id).await;
    let routed = state
        .router
        .route_detailed(&request.message, &context)
        .await;

    state
        .sessions
        .append(&request.session_id, MessageRole::User, &request.message)
        .await;
    state
        .sessions
        .append(&request.session_id, MessageRole::Assistant, &routed.reply)
        .await;

    let invoker = state.router.invoker();
    let current_model = invoker.current_model_name().to_string();
    let fallback_reason = invoker.fallback_reason();

    let mut reply = routed.reply;
    if invoker.should_notify() {
        if let Some(reason) = fallback_reason {
            debug!(model = %current_model, reason = %reason, "Replying on fallback model");
            reply.push_str(&fallback_notice(&current_model, reason));
        }
    }

    debug!(agent = %routed.agent_used, confidence = routed.confidence, "Reply ready");

    Ok(Json(ChatResponse {
        reply,
        agent_used: routed.agent_used,
        confidence: routed.confidence,
        using_fallback: invoker.is_using_fallback(),
        fallback_reason,
        current_model,
    }))
}

/// Registered responders and their keywords.
#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentInfo>,
    pub capabilities: BTreeMap<String, Vec<String>>,
}

pub async fn list_agents(State(state): State<Arc<AppState>>) -> Json<AgentsResponse> {
    Json(AgentsResponse {
        agents: state.registry.list(),
        capabilities: state.registry.capabilities_summary(),
    })
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn fallback_status(State(state): State<Arc<AppState>>) -> Json<SystemFallbackStatus> {
    Json(state.manager.system_status())
}

/// Put every model client back on its primary model.
pub async fn reset_fallbacks(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.manager.reset_all();
    info!("All agents reset to primary models");
    Json(MessageResponse {
        message: "All agents reset to primary models",
    })
}

/// Switch every model client that has a fallback onto it.
pub async fn force_fallbacks(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.manager.force_all(FallbackReason::ManualOverride);
    info!("All agents switched to fallback models");
    Json(MessageResponse {
        message: "All agents switched to fallback models",
    })
}
