//! The orchestration loop.
//!
//! One user request is driven through possibly-many model/tool round trips:
//! call the model with the full history and tool schema, process each
//! response part in order (text is surfaced, tool calls are executed and
//! their results appended before anything else happens), and stop the first
//! time a response carries no tool calls. An iteration ceiling guards
//! against a model that keeps requesting tools forever; hitting it is a
//! policy outcome, not an error, and the session stays usable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use factotum_core::config::AgentConfig;
use factotum_core::conversation::Conversation;
use factotum_core::error::ModelError;
use factotum_core::model::{ChatModel, ResponsePart};
use factotum_core::schema::ToolSpec;
use factotum_memory::SemanticMemory;
use factotum_tools::ToolRegistry;

/// How a processed user turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced a final response within the iteration budget.
    Completed,
    /// The iteration ceiling was reached while the model kept requesting
    /// tools. The conversation remains valid and the user can continue.
    LimitReached,
    /// The cancellation flag tripped; every turn appended so far stands.
    Cancelled,
}

/// Shared cancellation flag, checked at the top of every loop iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the next turn can run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One interactive session: conversation state plus everything needed to
/// advance it.
pub struct Session<M: ChatModel> {
    model: M,
    registry: ToolRegistry,
    memory: Arc<Mutex<SemanticMemory>>,
    conversation: Conversation,
    /// Schema advertisement, built once per session.
    specs: Vec<ToolSpec>,
    config: AgentConfig,
    cancel: CancelFlag,
}

impl<M: ChatModel> Session<M> {
    pub fn new(
        model: M,
        registry: ToolRegistry,
        memory: Arc<Mutex<SemanticMemory>>,
        config: AgentConfig,
    ) -> Self {
        let specs = registry.specs();
        let mut conversation = Conversation::new();
        conversation.push_user_text("You are an AI assistant with memory capabilities.");
        conversation.push_model_text(
            "I am Factotum, your personal AI assistant. I can learn from our interactions. \
             How can I help you today?",
        );

        Self {
            model,
            registry,
            memory,
            conversation,
            specs,
            config,
            cancel: CancelFlag::new(),
        }
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Process one user request to completion.
    ///
    /// Text parts are passed to `emit` as they arrive, so interleaved text
    /// surfaces in the order the model produced it. A model failure is
    /// propagated to the caller; the conversation keeps every turn appended
    /// before the failure and the session can continue with the next input.
    pub fn process(
        &mut self,
        input: &str,
        emit: &mut dyn FnMut(&str),
    ) -> Result<TurnOutcome, ModelError> {
        // Context first, literal input second: the literal request must be
        // the most recent turn when the model weighs recency.
        if self.config.memory.enabled {
            let recalled = {
                let store = match self.memory.lock() {
                    Ok(store) => store,
                    Err(poisoned) => poisoned.into_inner(),
                };
                store.recall(input, self.config.memory.recall_top_n)
            };
            if !recalled.is_empty() {
                tracing::debug!(count = recalled.len(), "Injecting recalled memories");
                self.conversation
                    .push_user_text(format!("Relevant memories:\n{}", recalled.join("\n")));
            }
        }

        self.conversation.push_user_text(input);

        let mut iteration = 0;
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(iteration, "Turn cancelled");
                return Ok(TurnOutcome::Cancelled);
            }

            iteration += 1;
            tracing::debug!(iteration, turns = self.conversation.len(), "Calling model");
            let response = self.model.generate(&self.conversation, &self.specs)?;

            let mut has_tool_calls = false;
            for part in response.parts {
                match part {
                    ResponsePart::ToolCall(call) => {
                        has_tool_calls = true;
                        tracing::debug!(iteration, tool = %call.name, "Model requested tool");
                        let result = self.registry.execute(&call.name, call.args.clone());
                        // The exchange lands in history immediately, so a
                        // later part of this same response already sees this
                        // tool's outcome on the next model call.
                        self.conversation.record_tool_exchange(call, result);
                    }
                    ResponsePart::Text(text) => {
                        if text.is_empty() {
                            continue;
                        }
                        emit(&text);
                        self.conversation.push_model_text(text);
                    }
                }
            }

            if !has_tool_calls {
                return Ok(TurnOutcome::Completed);
            }
            if iteration >= self.config.max_iterations {
                tracing::warn!(
                    iteration,
                    max = self.config.max_iterations,
                    "Iteration ceiling reached while tools were still requested"
                );
                return Ok(TurnOutcome::LimitReached);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use factotum_core::model::{ModelResponse, ToolCallRequest};
    use serde_json::Map;
    use tempfile::tempdir;

    /// Plays back queued responses; afterwards keeps answering plain text.
    struct QueuedModel {
        responses: RefCell<VecDeque<ModelResponse>>,
        calls: RefCell<usize>,
    }

    impl QueuedModel {
        fn new(responses: Vec<ModelResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl ChatModel for QueuedModel {
        fn generate(
            &self,
            _history: &Conversation,
            _tools: &[ToolSpec],
        ) -> Result<ModelResponse, ModelError> {
            *self.calls.borrow_mut() += 1;
            Ok(self
                .responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| ModelResponse::text("done")))
        }
    }

    /// Always requests the same tool, forever.
    struct RelentlessModel {
        calls: RefCell<usize>,
    }

    impl ChatModel for RelentlessModel {
        fn generate(
            &self,
            _history: &Conversation,
            _tools: &[ToolSpec],
        ) -> Result<ModelResponse, ModelError> {
            *self.calls.borrow_mut() += 1;
            Ok(ModelResponse::tool_call(ToolCallRequest::new(
                "get_system_info",
                Map::new(),
            )))
        }
    }

    fn session_with<Mdl: ChatModel>(model: Mdl, max_iterations: usize) -> Session<Mdl> {
        let dir = tempdir().unwrap();
        let memory = Arc::new(Mutex::new(SemanticMemory::open(
            dir.path().join("memory.json"),
            32,
            0.85,
        )));
        let config = AgentConfig {
            max_iterations,
            ..AgentConfig::default()
        };
        Session::new(model, ToolRegistry::new(), memory, config)
    }

    fn tool_call(name: &str) -> ModelResponse {
        ModelResponse::tool_call(ToolCallRequest::new(name, Map::new()))
    }

    #[test]
    fn n_tool_rounds_take_n_plus_one_model_calls() {
        let model = QueuedModel::new(vec![
            tool_call("get_system_info"),
            tool_call("get_system_info"),
            tool_call("get_system_info"),
            ModelResponse::text("all finished"),
        ]);
        let mut session = session_with(model, 15);

        let mut replies = Vec::new();
        let outcome = session
            .process("inspect the machine", &mut |text| {
                replies.push(text.to_string())
            })
            .unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(session.model.call_count(), 4);
        assert_eq!(replies, vec!["all finished"]);

        // Three exchanges: each is a model tool-call turn plus a result turn.
        let tool_results = session
            .conversation()
            .turns()
            .iter()
            .filter(|t| t.role == factotum_core::conversation::Role::ToolResult)
            .count();
        assert_eq!(tool_results, 3);
        assert!(session.conversation().tool_results_are_paired());
    }

    #[test]
    fn relentless_tool_requests_hit_the_ceiling() {
        let mut session = session_with(RelentlessModel { calls: RefCell::new(0) }, 5);

        let outcome = session.process("loop forever", &mut |_| {}).unwrap();

        assert_eq!(outcome, TurnOutcome::LimitReached);
        assert_eq!(*session.model.calls.borrow(), 5);
        assert!(session.conversation().tool_results_are_paired());
    }

    #[test]
    fn unknown_tool_results_feed_back_as_errors() {
        let model = QueuedModel::new(vec![
            tool_call("imaginary_tool"),
            ModelResponse::text("recovered"),
        ]);
        let mut session = session_with(model, 15);

        let outcome = session.process("try something odd", &mut |_| {}).unwrap();
        assert_eq!(outcome, TurnOutcome::Completed);

        let error_result = session.conversation().turns().iter().find_map(|t| {
            match &t.content {
                factotum_core::conversation::TurnContent::ToolResult { name, payload }
                    if name == "imaginary_tool" =>
                {
                    Some(payload.clone())
                }
                _ => None,
            }
        });
        assert_eq!(
            error_result.unwrap()["error"],
            "Unknown function: imaginary_tool"
        );
    }

    #[test]
    fn interleaved_parts_are_processed_in_order() {
        let model = QueuedModel::new(vec![
            ModelResponse::from_parts(vec![
                ResponsePart::Text("checking now".to_string()),
                ResponsePart::ToolCall(ToolCallRequest::new("missing_tool", Map::new())),
            ]),
            ModelResponse::text("summary"),
        ]);
        let mut session = session_with(model, 15);

        let mut replies = Vec::new();
        session
            .process("go", &mut |text| replies.push(text.to_string()))
            .unwrap();

        assert_eq!(replies, vec!["checking now", "summary"]);

        // The text turn precedes the tool exchange in history.
        let turns = session.conversation().turns();
        let text_idx = turns
            .iter()
            .position(|t| matches!(&t.content,
                factotum_core::conversation::TurnContent::Text(s) if s == "checking now"))
            .unwrap();
        let call_idx = turns
            .iter()
            .position(|t| {
                matches!(
                    &t.content,
                    factotum_core::conversation::TurnContent::ToolCall(_)
                )
            })
            .unwrap();
        assert!(text_idx < call_idx);
    }

    #[test]
    fn cancellation_exits_cleanly() {
        let model = QueuedModel::new(vec![tool_call("get_system_info")]);
        let mut session = session_with(model, 15);

        session.cancel_flag().cancel();
        let outcome = session.process("anything", &mut |_| {}).unwrap();

        assert_eq!(outcome, TurnOutcome::Cancelled);
        // The user turn was appended before the cancel check; nothing is
        // half-written.
        assert!(session.conversation().tool_results_are_paired());

        // After resetting the flag the session keeps working.
        session.cancel_flag().reset();
        let outcome = session.process("again", &mut |_| {}).unwrap();
        assert_eq!(outcome, TurnOutcome::Completed);
    }

    #[test]
    fn recalled_memories_precede_the_literal_input() {
        let dir = tempdir().unwrap();
        let memory = Arc::new(Mutex::new(SemanticMemory::open(
            dir.path().join("memory.json"),
            32,
            0.85,
        )));
        {
            let mut store = memory.lock().unwrap();
            store.remember("the user's favorite editor is helix").unwrap();
        }

        let mut config = AgentConfig::default();
        config.memory.enabled = true;
        let mut session = Session::new(
            QueuedModel::new(vec![ModelResponse::text("noted")]),
            ToolRegistry::new(),
            memory,
            config,
        );

        session.process("which editor do I like?", &mut |_| {}).unwrap();

        let turns = session.conversation().turns();
        let memory_idx = turns
            .iter()
            .position(|t| matches!(&t.content,
                factotum_core::conversation::TurnContent::Text(s)
                    if s.starts_with("Relevant memories:")))
            .expect("memory context turn");
        let input_idx = turns
            .iter()
            .position(|t| matches!(&t.content,
                factotum_core::conversation::TurnContent::Text(s)
                    if s == "which editor do I like?"))
            .expect("literal input turn");
        assert!(memory_idx < input_idx);
        assert_eq!(turns[memory_idx].role, factotum_core::conversation::Role::User);
    }

    #[test]
    fn model_failure_leaves_session_usable() {
        struct FailingModel {
            failed: RefCell<bool>,
        }
        impl ChatModel for FailingModel {
            fn generate(
                &self,
                _history: &Conversation,
                _tools: &[ToolSpec],
            ) -> Result<ModelResponse, ModelError> {
                if !*self.failed.borrow() {
                    *self.failed.borrow_mut() = true;
                    Err(ModelError::Transport("connection reset".to_string()))
                } else {
                    Ok(ModelResponse::text("back online"))
                }
            }
        }

        let mut session = session_with(
            FailingModel {
                failed: RefCell::new(false),
            },
            15,
        );

        assert!(session.process("first", &mut |_| {}).is_err());
        let outcome = session.process("second", &mut |_| {}).unwrap();
        assert_eq!(outcome, TurnOutcome::Completed);
        assert!(session.conversation().tool_results_are_paired());
    }
}
