//! Error types shared across the workspace.

use crate::tool::ToolKind;

/// Failures at the model-invocation boundary.
///
/// These are contained per user turn: the session logs the error and returns
/// to the prompt instead of crashing.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// Failures while assembling the tool registry at startup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(ToolKind),
}

/// Failures inside the semantic memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("memory store I/O error: {0}")]
    Io(String),

    #[error("memory store serialization error: {0}")]
    Serialization(String),
}
