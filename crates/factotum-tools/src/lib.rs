//! # Factotum Tools
//!
//! The assistant's tool surface: a registry keyed by [`ToolKind`], a
//! failure-containing executor, and the standard tool implementations
//! (file system, MySQL, system, web, memory).

pub mod db;
pub mod fs;
pub mod memory;
pub mod registry;
pub mod system;
pub mod web;

use std::sync::{Arc, Mutex};

use factotum_core::config::AgentConfig;
use factotum_core::error::RegistryError;
use factotum_core::tool::ToolKind;
use factotum_memory::SemanticMemory;

pub use registry::ToolRegistry;

/// Assemble the full standard registry: every tool the assistant ships with.
///
/// The set is fixed for the process lifetime; registration failures can only
/// come from duplicate identifiers, which would be a wiring bug.
pub fn standard_registry(
    config: &AgentConfig,
    store: Arc<Mutex<SemanticMemory>>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    // File tools
    registry.register(Arc::new(fs::CheckTrashBinTool))?;
    registry.register(Arc::new(fs::CleanOldTrashFilesTool))?;
    registry.register(Arc::new(fs::ReadFileContentTool))?;
    registry.register(Arc::new(fs::WriteFileContentTool))?;
    registry.register(Arc::new(fs::ListDirectoryContentsTool))?;
    registry.register(Arc::new(fs::FindFilesTool))?;
    registry.register(Arc::new(fs::SearchTextTool))?;

    // Database tools
    let mysql = config.mysql.clone();
    registry.register(Arc::new(db::CreateMysqlDatabaseTool::new(mysql.clone())))?;
    registry.register(Arc::new(db::ExecuteMysqlCommandTool::new(mysql.clone())))?;
    registry.register(Arc::new(db::AnalyzeMysqlDatabaseStructureTool::new(
        mysql.clone(),
    )))?;
    registry.register(Arc::new(db::ListMysqlDatabasesTool::new(mysql)))?;

    // System tools
    registry.register(Arc::new(system::GetSystemInfoTool))?;
    registry.register(Arc::new(system::RunPythonScriptTool))?;
    registry.register(Arc::new(system::AnalyzePythonCodeTool))?;
    registry.register(Arc::new(system::SendSystemNotificationTool))?;
    registry.register(Arc::new(system::ExecuteCliCommandTool))?;

    // Web tools
    registry.register(Arc::new(web::FetchUrlContentTool))?;

    // Memory tools
    registry.register(Arc::new(memory::RememberFactTool::new(store.clone())))?;
    registry.register(Arc::new(memory::ForgetTool::new(store)))?;

    debug_assert_eq!(registry.len(), ToolKind::all().len());
    Ok(registry)
}
