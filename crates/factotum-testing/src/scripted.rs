//! A model double that plays back a fixed script.

use std::collections::VecDeque;
use std::sync::Mutex;

use factotum_core::conversation::Conversation;
use factotum_core::error::ModelError;
use factotum_core::model::{ChatModel, ModelResponse};
use factotum_core::schema::ToolSpec;

/// Plays back queued responses in order; once the script is exhausted it
/// answers with a plain terminal text so loops always converge.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    calls: Mutex<usize>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        }
    }

    /// How many times `generate` has been invoked.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ChatModel for ScriptedModel {
    fn generate(
        &self,
        _history: &Conversation,
        _tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ModelResponse::text("done")))
    }
}

/// A model double that fails every call, for error-containment tests.
pub struct FailingModel;

impl ChatModel for FailingModel {
    fn generate(
        &self,
        _history: &Conversation,
        _tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError> {
        Err(ModelError::Transport("scripted failure".to_string()))
    }
}
