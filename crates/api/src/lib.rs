//! REST API gateway for switchboard.
//!
//! This crate exposes the routing system over HTTP and owns the
//! composition root that wires responders, the registry and the router.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/chat` - Send a message to the router
//! - `GET /api/agents` - Registered responders and their keywords
//! - `GET /api/fallback/status` - Primary/fallback state of every model client
//! - `POST /api/fallback/reset` - Put every client back on its primary model
//! - `POST /api/fallback/force` - Switch every client to its fallback model
//!
//! # Architecture
//!
//! ```text
//! Client (web UI, curl, ...)
//!    │
//!    ▼
//! ┌─────────────────┐
//! │   API Gateway   │ ◄── This crate
//! │     (Axum)      │
//! └────────┬────────┘
//!          │
//!          ├──────────────────┬──────────────────┐
//!          ▼                  ▼                  ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Router      │ │  Session store  │ │ Fallback manager│
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```

pub mod routes;
pub mod state;

use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/health", get(routes::health))
        .route("/api/chat", post(routes::chat))
        .route("/api/agents", get(routes::list_agents))
        .route("/api/fallback/status", get(routes::fallback_status))
        .route("/api/fallback/reset", post(routes::reset_fallbacks))
        .route("/api/fallback/force", post(routes::force_fallbacks))
        // Middleware
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    info!(%addr, "Starting switchboard API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
