//! # Factotum Core
//!
//! Core traits and types for the Factotum assistant: the conversation model,
//! the tool capability surface, and the model-invocation boundary. The
//! concrete tool implementations live in `factotum-tools`, the orchestration
//! loop in `factotum-agent`.

pub mod config;
pub mod conversation;
pub mod error;
pub mod model;
pub mod schema;
pub mod tool;

pub use config::{AgentConfig, GenerationConfig, MemoryConfig, MysqlConfig};
pub use conversation::{Conversation, Role, Turn, TurnContent};
pub use error::{MemoryError, ModelError, RegistryError};
pub use model::{ChatModel, ModelResponse, ResponsePart, ToolCallRequest};
pub use schema::{ArgError, ParamSpec, ParamType, ToolArgs, ToolSpec};
pub use tool::{FailureKind, Tool, ToolKind, ToolOutcome};
