//! Drive a full session through scripted exchanges.

use std::sync::{Arc, Mutex};

use factotum_agent::{Session, TurnOutcome};
use factotum_core::config::AgentConfig;
use factotum_core::error::ModelError;
use factotum_core::model::ModelResponse;
use factotum_core::tool::Tool;
use factotum_memory::SemanticMemory;
use factotum_tools::ToolRegistry;

use crate::scripted::ScriptedModel;

/// What one harness turn produced.
#[derive(Debug)]
pub struct HarnessReport {
    pub outcome: TurnOutcome,
    /// Text parts in the order they were emitted.
    pub replies: Vec<String>,
    /// Model invocations consumed by this turn.
    pub model_calls: usize,
}

/// A session wired to a scripted model, an isolated memory store and
/// whatever tools a test registers.
pub struct SessionHarness {
    session: Session<ScriptedModel>,
    calls_before: usize,
    // Keeps the memory store's directory alive for the harness lifetime.
    _tempdir: tempfile::TempDir,
}

impl SessionHarness {
    pub fn new(responses: Vec<ModelResponse>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self::with_config(responses, tools, AgentConfig::default())
    }

    pub fn with_config(
        responses: Vec<ModelResponse>,
        tools: Vec<Arc<dyn Tool>>,
        config: AgentConfig,
    ) -> Self {
        let tempdir = tempfile::tempdir().expect("create harness tempdir");
        let memory = Arc::new(Mutex::new(SemanticMemory::open(
            tempdir.path().join("memory.json"),
            config.memory.embedding_dim,
            config.memory.similarity_threshold,
        )));

        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool).expect("unique tool kinds");
        }

        Self {
            session: Session::new(ScriptedModel::new(responses), registry, memory, config),
            calls_before: 0,
            _tempdir: tempdir,
        }
    }

    /// Process one user input and report what happened.
    pub fn run(&mut self, input: &str) -> Result<HarnessReport, ModelError> {
        let mut replies = Vec::new();
        let outcome = self
            .session
            .process(input, &mut |text| replies.push(text.to_string()))?;

        let total_calls = self.session_model_calls();
        let model_calls = total_calls - self.calls_before;
        self.calls_before = total_calls;

        Ok(HarnessReport {
            outcome,
            replies,
            model_calls,
        })
    }

    pub fn session(&self) -> &Session<ScriptedModel> {
        &self.session
    }

    pub fn cancel_flag(&self) -> factotum_agent::CancelFlag {
        self.session.cancel_flag()
    }

    fn session_model_calls(&self) -> usize {
        self.session.model().call_count()
    }
}
