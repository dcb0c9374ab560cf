//! Tool registry and the failure-containing executor.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use factotum_core::error::RegistryError;
use factotum_core::schema::{ToolArgs, ToolSpec};
use factotum_core::tool::{Tool, ToolKind, ToolOutcome};

/// Mapping from tool identifier to implementation.
///
/// Built once at startup and fixed for the process lifetime. Lookup is by
/// the closed [`ToolKind`] enum; a model naming something outside that set
/// is handled by [`ToolRegistry::execute`], not by the registry itself.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Fails if its identifier is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let kind = tool.kind();
        if self.tools.contains_key(&kind) {
            return Err(RegistryError::DuplicateTool(kind));
        }
        self.tools.insert(kind, tool);
        Ok(())
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    /// Schema advertisement for the model, in canonical tool order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        ToolKind::all()
            .iter()
            .filter_map(|kind| self.tools.get(kind))
            .map(|tool| tool.spec())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call by wire name.
    ///
    /// This is the failure-isolation boundary: whatever happens inside,
    /// the return value is a JSON object that is either the tool's success
    /// payload or `{"error": <message>}`. A bad call never aborts the
    /// conversation.
    pub fn execute(&self, name: &str, args: Map<String, Value>) -> Value {
        let args_display = Value::Object(args.clone());
        tracing::info!(tool = name, args = %args_display, "Executing tool");

        let Some(tool) = ToolKind::from_name(name).and_then(|kind| self.get(kind)) else {
            return serde_json::json!({ "error": format!("Unknown function: {name}") });
        };

        let args = ToolArgs::new(args);
        if let Err(e) = args.validate(&tool.spec()) {
            return serde_json::json!({
                "error": format!("Function execution error: {e}")
            });
        }

        match tool.call(args) {
            ToolOutcome::Success { payload } => payload,
            ToolOutcome::Failure { reason } => serde_json::json!({
                "error": format!("Function execution error: {}", reason.message())
            }),
        }
    }
}
