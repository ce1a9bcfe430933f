//! Routing core for switchboard.
//!
//! The coordinator is the front door for every chat message:
//! 1. Scores the message against each registered responder's capabilities
//! 2. Delegates to a confident match, or answers with its own model
//! 3. Owns the configuration that decides which model each responder uses
//!
//! # Architecture
//!
//! ```text
//! User Request
//!      │
//!      ▼
//! ┌─────────────────┐
//! │   Coordinator   │  ◄── capability scores (or persona selection)
//! │   (this crate)  │
//! └────────┬────────┘
//!          │
//!    ┌─────┴─────┬──────────┐
//!    ▼           ▼          ▼
//! [Coding]   [General]  [Direct]
//!  Agent      Agent      answer
//! ```
//!
//! Every model call goes through a `FallbackClient`, so a responder whose
//! primary model runs out of credit keeps answering on its fallback.

pub mod config;
pub mod persona;
pub mod registry;
pub mod routing;
pub mod triage;

pub use config::{RoutingMode, SwitchboardConfig, API_KEY_ENV, DEFAULT_FALLBACK_NAME};
pub use persona::{PersonaCoordinator, PERSONA_ROUTER_INVOKER, PERSONA_ROUTER_NAME};
pub use registry::{AgentRegistry, DEFAULT_OVERRIDE_CONFIDENCE, DEFAULT_OVERRIDE_THRESHOLD};
pub use routing::{RoutedReply, Router, APOLOGY};
pub use triage::{Coordinator, CoordinatorSettings, ORCHESTRATOR_INVOKER, ORCHESTRATOR_NAME};
