//! Error types for the cangalha assistant.

use crate::llm::CompletionError;

/// Top-level error type for the assistant.
///
/// Command and lookup failures never surface here: they are turned into
/// local advisory messages where they happen. This type covers the
/// infrastructure around a turn (configuration, persistence, collaborators).
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Durable key/value storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Completion service error.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Speech recognition or synthesis collaborator error.
    #[error("speech error: {0}")]
    Speech(String),

    /// Camera capture collaborator error.
    #[error("camera error: {0}")]
    Camera(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
