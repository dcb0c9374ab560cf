//! Memory tools: thin adapters over the semantic fact store.
//!
//! These are the only tools with state: they close over the shared store.
//! Storage failures surface as `status: "error"` payloads rather than tool
//! failures, so the model can read and explain them.

use std::sync::{Arc, Mutex};

use serde_json::json;

use factotum_core::schema::{ParamSpec, ParamType, ToolArgs, ToolSpec};
use factotum_core::tool::{Tool, ToolKind, ToolOutcome};
use factotum_memory::{ForgetOutcome, RememberOutcome, SemanticMemory};

type SharedMemory = Arc<Mutex<SemanticMemory>>;

/// Save a fact to long-term memory.
pub struct RememberFactTool {
    store: SharedMemory,
}

impl RememberFactTool {
    pub fn new(store: SharedMemory) -> Self {
        Self { store }
    }
}

impl Tool for RememberFactTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RememberFact
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Saves a fact to the agent's long-term memory.").with_param(
            ParamSpec::required("fact", ParamType::String, "The fact to be remembered."),
        )
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let fact = args.str_or("fact", "");

        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };
        match store.remember(fact) {
            Ok(RememberOutcome::Stored) => ToolOutcome::success(json!({
                "status": "success",
                "message": format!("Remembered: {fact}"),
            })),
            Ok(RememberOutcome::Skipped {
                existing,
                similarity,
            }) => ToolOutcome::success(json!({
                "status": "skipped",
                "message": format!("A similar fact is already stored: {existing}"),
                "similarity": similarity,
            })),
            Err(e) => ToolOutcome::success(json!({
                "status": "error",
                "message": e.to_string(),
            })),
        }
    }
}

/// Search for and optionally delete similar memories.
pub struct ForgetTool {
    store: SharedMemory,
}

impl ForgetTool {
    pub fn new(store: SharedMemory) -> Self {
        Self { store }
    }
}

impl Tool for ForgetTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Forget
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Searches for and optionally removes semantically similar memories from the agent's long-term memory.",
        )
        .with_param(ParamSpec::required(
            "fact",
            ParamType::String,
            "The fact to forget; similar memories will be searched based on this input.",
        ))
        .with_param(ParamSpec::optional(
            "confirm",
            ParamType::Boolean,
            "If true, confirms and deletes matched memories. If false, just previews matches.",
        ))
        .with_param(ParamSpec::optional(
            "similarity_threshold",
            ParamType::Number,
            "Optional similarity threshold (0.0 - 1.0) for matching memories (default: 0.85).",
        ))
        .with_param(ParamSpec::optional(
            "top_n",
            ParamType::Integer,
            "Optional number of top similar memories to consider for deletion (default: 3).",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let fact = args.str_or("fact", "");
        let confirm = args.bool_or("confirm", false);
        let threshold = args.f64_or("similarity_threshold", 0.85) as f32;
        let top_n = args.i64_or("top_n", 3).max(1) as usize;

        let mut store = match self.store.lock() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        };
        match store.forget(fact, confirm, threshold, top_n) {
            Ok(ForgetOutcome::NotFound) => ToolOutcome::success(json!({
                "status": "not_found",
                "message": "No sufficiently similar memories found.",
            })),
            Ok(ForgetOutcome::Preview(matches)) => ToolOutcome::success(json!({
                "status": "preview",
                "matches": matches
                    .iter()
                    .map(|m| json!({"fact": m.fact, "similarity": m.similarity}))
                    .collect::<Vec<_>>(),
            })),
            Ok(ForgetOutcome::Deleted(facts)) => ToolOutcome::success(json!({
                "status": "deleted",
                "deleted_facts": facts,
            })),
            Err(e) => ToolOutcome::success(json!({
                "status": "error",
                "message": e.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};
    use tempfile::tempdir;

    fn args(json: Value) -> ToolArgs {
        match json {
            Value::Object(map) => ToolArgs::new(map),
            _ => ToolArgs::new(Map::new()),
        }
    }

    fn shared_store(dir: &tempfile::TempDir) -> SharedMemory {
        Arc::new(Mutex::new(SemanticMemory::open(
            dir.path().join("memory.json"),
            64,
            0.85,
        )))
    }

    #[test]
    fn remember_then_skip_duplicate() {
        let dir = tempdir().unwrap();
        let store = shared_store(&dir);
        let tool = RememberFactTool::new(store);

        let first = tool.call(args(json!({"fact": "user likes rust"})));
        assert_eq!(first.payload().unwrap()["status"], "success");

        let second = tool.call(args(json!({"fact": "user likes rust"})));
        assert_eq!(second.payload().unwrap()["status"], "skipped");
    }

    #[test]
    fn forget_previews_then_deletes() {
        let dir = tempdir().unwrap();
        let store = shared_store(&dir);
        RememberFactTool::new(store.clone()).call(args(json!({"fact": "ephemeral note"})));

        let forget = ForgetTool::new(store);
        let preview = forget.call(args(json!({"fact": "ephemeral note"})));
        assert_eq!(preview.payload().unwrap()["status"], "preview");

        let deleted = forget.call(args(json!({"fact": "ephemeral note", "confirm": true})));
        let payload = deleted.payload().unwrap();
        assert_eq!(payload["status"], "deleted");
        assert_eq!(payload["deleted_facts"], json!(["ephemeral note"]));

        let gone = forget.call(args(json!({"fact": "ephemeral note", "confirm": true})));
        assert_eq!(gone.payload().unwrap()["status"], "not_found");
    }
}
