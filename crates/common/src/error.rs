//! Error types for switchboard.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitchboardError {
    /// A model backend call failed. The message text is what the
    /// fallback classifier inspects, so provider wording must survive.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Delegation error: {0}")]
    Delegation(String),

    #[error("All attempts failed for {0}")]
    AllAttemptsFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwitchboardError>;
