//! Conversation memory for switchboard.
//!
//! Sessions are keyed by the caller-supplied session id and hold a
//! bounded window of recent turns. Nothing is persisted; a restart
//! starts every session fresh.

pub mod store;
pub mod types;

pub use store::SessionStore;
pub use types::{MemoryConfig, Turn};
