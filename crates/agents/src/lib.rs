//! Specialist responders for switchboard.
//!
//! - **Coding assistant**: programming, debugging, architecture
//! - **General assistant**: conversation and everything else; the
//!   registry default
//! - **Persona agents**: configured personas (main, developer,
//!   researcher, creative, business) picked by the persona router
//!
//! Every responder is built around an [`AssistantCore`]: a profile, a
//! bounded conversation history and a [`FallbackClient`] for model
//! access.
//!
//! [`FallbackClient`]: switchboard_llm::FallbackClient

pub mod assistant;
pub mod coding;
pub mod general;
pub mod persona;

pub use assistant::{AssistantCore, AssistantProfile, DEFAULT_MAX_HISTORY};
pub use coding::{CodingAssistant, CODING_AGENT_NAME};
pub use general::{GeneralAssistant, GENERAL_AGENT_NAME};
pub use persona::PersonaAgent;
