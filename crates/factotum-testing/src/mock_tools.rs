//! Tool doubles that record how they were called.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use factotum_core::schema::{ToolArgs, ToolSpec};
use factotum_core::tool::{FailureKind, Tool, ToolKind, ToolOutcome};

/// A tool that returns a canned outcome and tracks every invocation.
#[derive(Clone)]
pub struct RecordingTool {
    kind: ToolKind,
    outcome: ToolOutcome,
    call_count: Arc<Mutex<usize>>,
    call_args: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTool {
    /// A recording tool that always succeeds with `payload`.
    pub fn succeeding(kind: ToolKind, payload: Value) -> Self {
        Self {
            kind,
            outcome: ToolOutcome::success(payload),
            call_count: Arc::new(Mutex::new(0)),
            call_args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A recording tool that always fails with `message`.
    pub fn failing(kind: ToolKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: ToolOutcome::failed(FailureKind::Internal {
                message: message.into(),
            }),
            call_count: Arc::new(Mutex::new(0)),
            call_args: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Argument objects from every call, in order.
    pub fn recorded_args(&self) -> Vec<Value> {
        self.call_args.lock().unwrap().clone()
    }
}

impl Tool for RecordingTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind, "recording test double")
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        *self.call_count.lock().unwrap() += 1;
        self.call_args
            .lock()
            .unwrap()
            .push(Value::Object(args.as_map().clone()));
        self.outcome.clone()
    }
}
