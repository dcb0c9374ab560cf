//! Tool identifiers, the tool capability trait, and execution outcomes.

use crate::schema::{ToolArgs, ToolSpec};

/// Closed set of tools the assistant can invoke.
///
/// Using an enum instead of open string dispatch gives compile-time
/// exhaustiveness over the tool surface while keeping the wire names
/// (the strings the model sees) in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    // File tools
    CheckTrashBin,
    CleanOldTrashFiles,
    ReadFileContent,
    WriteFileContent,
    ListDirectoryContents,
    FindFiles,
    SearchText,

    // Database tools
    CreateMysqlDatabase,
    ExecuteMysqlCommand,
    AnalyzeMysqlDatabaseStructure,
    ListMysqlDatabases,

    // System tools
    GetSystemInfo,
    RunPythonScript,
    AnalyzePythonCode,
    SendSystemNotification,
    ExecuteCliCommand,

    // Web tools
    FetchUrlContent,

    // Memory tools
    RememberFact,
    Forget,
}

impl ToolKind {
    /// Wire name of the tool, as advertised to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::CheckTrashBin => "check_trash_bin",
            ToolKind::CleanOldTrashFiles => "clean_old_trash_files",
            ToolKind::ReadFileContent => "read_file_content",
            ToolKind::WriteFileContent => "write_file_content",
            ToolKind::ListDirectoryContents => "list_directory_contents",
            ToolKind::FindFiles => "find_files",
            ToolKind::SearchText => "search_text",
            ToolKind::CreateMysqlDatabase => "create_mysql_database",
            ToolKind::ExecuteMysqlCommand => "execute_mysql_command",
            ToolKind::AnalyzeMysqlDatabaseStructure => "analyze_mysql_database_structure",
            ToolKind::ListMysqlDatabases => "list_mysql_databases",
            ToolKind::GetSystemInfo => "get_system_info",
            ToolKind::RunPythonScript => "run_python_script",
            ToolKind::AnalyzePythonCode => "analyze_python_code",
            ToolKind::SendSystemNotification => "send_system_notification",
            ToolKind::ExecuteCliCommand => "execute_cli_command",
            ToolKind::FetchUrlContent => "fetch_url_content",
            ToolKind::RememberFact => "remember_fact",
            ToolKind::Forget => "forget",
        }
    }

    /// Try to parse a wire name back into a `ToolKind`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }

    /// All tools, in advertisement order.
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::CheckTrashBin,
            ToolKind::CleanOldTrashFiles,
            ToolKind::ReadFileContent,
            ToolKind::WriteFileContent,
            ToolKind::ListDirectoryContents,
            ToolKind::FindFiles,
            ToolKind::SearchText,
            ToolKind::CreateMysqlDatabase,
            ToolKind::ExecuteMysqlCommand,
            ToolKind::AnalyzeMysqlDatabaseStructure,
            ToolKind::ListMysqlDatabases,
            ToolKind::GetSystemInfo,
            ToolKind::RunPythonScript,
            ToolKind::AnalyzePythonCode,
            ToolKind::SendSystemNotification,
            ToolKind::ExecuteCliCommand,
            ToolKind::FetchUrlContent,
            ToolKind::RememberFact,
            ToolKind::Forget,
        ]
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Categorized failure reasons for tool execution.
///
/// Structured instead of a plain string so callers can distinguish failure
/// classes, while `message()` keeps a uniform human-readable rendering for
/// the model-facing error payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// Invalid or malformed arguments reached the tool body.
    InvalidInput { message: String },
    /// Required resource not found (file, directory, database, ...).
    NotFound { resource: String },
    /// Local I/O failure.
    Io { message: String },
    /// Network-level failure.
    Network { message: String },
    /// Database-level failure.
    Database { message: String },
    /// A bounded operation ran out of time.
    Timeout { operation: String },
    /// The host platform does not support the operation.
    Unsupported { message: String },
    /// Anything else.
    Internal { message: String },
}

impl FailureKind {
    pub fn message(&self) -> String {
        match self {
            FailureKind::InvalidInput { message } => format!("Invalid input: {message}"),
            FailureKind::NotFound { resource } => format!("Not found: {resource}"),
            FailureKind::Io { message } => format!("I/O error: {message}"),
            FailureKind::Network { message } => format!("Network error: {message}"),
            FailureKind::Database { message } => format!("Database error: {message}"),
            FailureKind::Timeout { operation } => format!("Timed out: {operation}"),
            FailureKind::Unsupported { message } => format!("Unsupported: {message}"),
            FailureKind::Internal { message } => message.clone(),
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a tool.
///
/// A tool resolves to exactly one of two shapes: a JSON success payload or a
/// structured failure. Tool bodies never panic or propagate errors past this
/// boundary; the executor turns a `Failure` into the error-shaped payload
/// the model sees.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Success { payload: serde_json::Value },
    Failure { reason: FailureKind },
}

impl ToolOutcome {
    pub fn success(payload: serde_json::Value) -> Self {
        ToolOutcome::Success { payload }
    }

    pub fn failed(reason: FailureKind) -> Self {
        ToolOutcome::Failure { reason }
    }

    /// Convenience constructor wrapping a plain message in
    /// [`FailureKind::Internal`].
    pub fn failure(message: impl Into<String>) -> Self {
        ToolOutcome::Failure {
            reason: FailureKind::Internal {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&FailureKind> {
        match self {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Failure { reason } => Some(reason),
        }
    }
}

/// A capability the model may request by name.
///
/// Implementations are stateless wrappers over system facilities, except the
/// memory tools which close over the semantic store. `call` must resolve
/// every internal failure into a [`ToolOutcome::Failure`]; a single bad tool
/// call must never abort the conversation.
pub trait Tool: Send + Sync {
    /// The identifier this tool is registered under.
    fn kind(&self) -> ToolKind;

    /// Schema advertised to the model and used for argument validation.
    fn spec(&self) -> ToolSpec;

    /// Execute with validated arguments.
    fn call(&self, args: ToolArgs) -> ToolOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_round_trip() {
        for kind in ToolKind::all() {
            assert_eq!(ToolKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn unknown_name_does_not_parse() {
        assert_eq!(ToolKind::from_name("launch_rocket"), None);
        assert_eq!(ToolKind::from_name(""), None);
    }

    #[test]
    fn all_names_are_unique() {
        let mut names: Vec<_> = ToolKind::all().iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ToolKind::all().len());
    }

    #[test]
    fn outcome_shapes_are_exclusive() {
        let ok = ToolOutcome::success(serde_json::json!({"value": 1}));
        assert!(ok.is_success());
        assert!(ok.payload().is_some());
        assert!(ok.failure_reason().is_none());

        let err = ToolOutcome::failure("boom");
        assert!(!err.is_success());
        assert!(err.payload().is_none());
        assert_eq!(err.failure_reason().unwrap().message(), "boom");
    }
}
