//! Conversation history: role-tagged turns, appended in strict order.

use serde_json::Value;

use crate::model::ToolCallRequest;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    ToolResult,
}

/// What a turn carries.
#[derive(Debug, Clone)]
pub enum TurnContent {
    /// Plain text from the user or the model.
    Text(String),
    /// A tool invocation the model requested.
    ToolCall(ToolCallRequest),
    /// The payload a tool produced, keyed by the tool's wire name.
    ToolResult { name: String, payload: Value },
}

/// One entry in the conversation. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text(text.into()),
        }
    }

    pub fn model_tool_call(call: ToolCallRequest) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCall(call),
        }
    }

    pub fn tool_result(name: impl Into<String>, payload: Value) -> Self {
        Self {
            role: Role::ToolResult,
            content: TurnContent::ToolResult {
                name: name.into(),
                payload,
            },
        }
    }
}

/// Append-only ordered sequence of turns.
///
/// Never reordered or mutated in place; reset only when a session starts.
/// There is no eviction or summarization, so a long session grows without
/// bound (matching the behavior this design was ported from).
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) {
        self.push(Turn::user_text(text));
    }

    pub fn push_model_text(&mut self, text: impl Into<String>) {
        self.push(Turn::model_text(text));
    }

    /// Record one completed call: the model's request, then the result the
    /// tool produced. Appending both in one operation keeps the pairing
    /// invariant from ever being observable in a broken state.
    pub fn record_tool_exchange(&mut self, call: ToolCallRequest, payload: Value) {
        let name = call.name.clone();
        self.push(Turn::model_tool_call(call));
        self.push(Turn::tool_result(name, payload));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Verify that every tool-result turn is preceded by an unconsumed model
    /// turn requesting a tool of the same name. Used by tests; the append
    /// paths above cannot violate it.
    pub fn tool_results_are_paired(&self) -> bool {
        let mut pending: Vec<&str> = Vec::new();
        for turn in &self.turns {
            match &turn.content {
                TurnContent::ToolCall(call) if turn.role == Role::Model => {
                    pending.push(call.name.as_str());
                }
                TurnContent::ToolResult { name, .. } => {
                    match pending.iter().rposition(|n| *n == name) {
                        Some(idx) => {
                            pending.remove(idx);
                        }
                        None => return false,
                    }
                }
                _ => {}
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str) -> ToolCallRequest {
        ToolCallRequest {
            name: name.to_string(),
            args: serde_json::Map::new(),
        }
    }

    #[test]
    fn turns_preserve_append_order() {
        let mut conv = Conversation::new();
        conv.push_user_text("hi");
        conv.push_model_text("hello");
        conv.record_tool_exchange(call("get_system_info"), json!({"platform": "linux"}));

        assert_eq!(conv.len(), 4);
        assert_eq!(conv.turns()[0].role, Role::User);
        assert_eq!(conv.turns()[1].role, Role::Model);
        assert_eq!(conv.turns()[2].role, Role::Model);
        assert_eq!(conv.turns()[3].role, Role::ToolResult);
    }

    #[test]
    fn recorded_exchanges_keep_results_paired() {
        let mut conv = Conversation::new();
        conv.push_user_text("do things");
        conv.record_tool_exchange(call("find_files"), json!({"files": []}));
        // The same tool requested twice is fine; pairing is by name.
        conv.record_tool_exchange(call("find_files"), json!({"files": ["a"]}));
        conv.push_model_text("done");

        assert!(conv.tool_results_are_paired());
    }

    #[test]
    fn orphan_tool_result_is_detected() {
        let mut conv = Conversation::new();
        conv.push(Turn::tool_result("find_files", json!({})));
        assert!(!conv.tool_results_are_paired());
    }
}
