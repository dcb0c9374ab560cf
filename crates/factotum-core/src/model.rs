//! The model-invocation boundary.
//!
//! The model is an opaque capability: given the conversation so far and the
//! tool schema advertisement, it returns an ordered list of parts, each
//! either free text or a request to invoke a named tool. Retry and
//! rate-limit handling belong to implementations, not this boundary.

use serde_json::{Map, Value};

use crate::conversation::Conversation;
use crate::error::ModelError;
use crate::schema::ToolSpec;

/// A model-emitted instruction naming a tool and its arguments.
///
/// The name is kept as a raw string: a model may name a tool that does not
/// exist, and that must surface as a recoverable error result, not a parse
/// failure.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Map<String, Value>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One part of a model response, in the order the model emitted it.
#[derive(Debug, Clone)]
pub enum ResponsePart {
    Text(String),
    ToolCall(ToolCallRequest),
}

/// A complete model response: zero or more ordered parts.
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub parts: Vec<ResponsePart>,
}

impl ModelResponse {
    pub fn from_parts(parts: Vec<ResponsePart>) -> Self {
        Self { parts }
    }

    /// A response consisting of a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::Text(text.into())],
        }
    }

    /// A response consisting of a single tool-call part.
    pub fn tool_call(call: ToolCallRequest) -> Self {
        Self {
            parts: vec![ResponsePart::ToolCall(call)],
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ResponsePart::ToolCall(_)))
    }
}

/// Blocking chat-model invocation.
pub trait ChatModel {
    fn generate(
        &self,
        history: &Conversation,
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError>;
}
