//! Common types and traits shared across switchboard crates.
//!
//! This crate provides the foundational abstractions every responder and
//! the router agree on: the error type, the capability model with its
//! keyword scorer, and the [`Agent`] trait.

pub mod capability;
pub mod error;
pub mod message;
pub mod traits;

pub use capability::{score, Capability, DEFAULT_CAPABILITY_THRESHOLD};
pub use error::{Result, SwitchboardError};
pub use message::{ContextTurn, ConversationContext, MessageRole};
pub use traits::{Agent, AgentInfo, AgentKind, ModelTier};
