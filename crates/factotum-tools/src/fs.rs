//! File system tools: trash maintenance, reading, writing, listing,
//! finding and searching.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use globset::GlobBuilder;
use serde_json::{Value, json};
use walkdir::WalkDir;

use factotum_core::schema::{ParamSpec, ParamType, ToolArgs, ToolSpec};
use factotum_core::tool::{FailureKind, Tool, ToolKind, ToolOutcome};

/// Expand a leading `~` to the user's home directory.
pub(crate) fn expand_user(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

fn iso(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

fn days_since(time: SystemTime) -> i64 {
    SystemTime::now()
        .duration_since(time)
        .map(|d| (d.as_secs() / 86_400) as i64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Trash tools
// ---------------------------------------------------------------------------

struct TrashScan {
    trash_path: PathBuf,
    total_files: usize,
    total_size: u64,
    old_files: Vec<OldFile>,
}

struct OldFile {
    name: String,
    path: PathBuf,
    size: u64,
    modified: String,
    days_old: i64,
}

fn trash_dir() -> Result<PathBuf, FailureKind> {
    let home = dirs::home_dir().ok_or_else(|| FailureKind::NotFound {
        resource: "home directory".to_string(),
    })?;

    if cfg!(target_os = "macos") {
        Ok(home.join(".Trash"))
    } else if cfg!(target_os = "linux") {
        Ok(home.join(".local/share/Trash/files"))
    } else if cfg!(target_os = "windows") {
        let candidates = [
            PathBuf::from("C:\\$Recycle.Bin"),
            home.join("Desktop").join("$RECYCLE.BIN"),
        ];
        candidates
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| FailureKind::NotFound {
                resource: "Recycle Bin".to_string(),
            })
    } else {
        Err(FailureKind::Unsupported {
            message: format!("no trash location on {}", std::env::consts::OS),
        })
    }
}

fn scan_trash(days_threshold: i64) -> Result<TrashScan, FailureKind> {
    let trash_path = trash_dir()?;
    if !trash_path.exists() {
        return Err(FailureKind::NotFound {
            resource: format!("trash directory {}", trash_path.display()),
        });
    }

    let entries = fs::read_dir(&trash_path).map_err(|e| FailureKind::Io {
        message: format!("failed to read {}: {e}", trash_path.display()),
    })?;

    let mut total_files = 0;
    let mut total_size = 0;
    let mut old_files = Vec::new();

    for entry in entries.flatten() {
        // Entries that vanish or deny access mid-scan are skipped.
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        let size = meta.len();
        total_files += 1;
        total_size += size;

        let age_days = days_since(modified);
        if age_days >= days_threshold {
            old_files.push(OldFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                size,
                modified: iso(modified),
                days_old: age_days,
            });
        }
    }

    Ok(TrashScan {
        trash_path,
        total_files,
        total_size,
        old_files,
    })
}

/// Report trash contents older than a day threshold.
pub struct CheckTrashBinTool;

impl Tool for CheckTrashBinTool {
    fn kind(&self) -> ToolKind {
        ToolKind::CheckTrashBin
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Check Trash/Recycle Bin for files older than specified days",
        )
        .with_param(ParamSpec::optional(
            "days_threshold",
            ParamType::Integer,
            "Only show files older than this many days (default: 10)",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let days_threshold = args.i64_or("days_threshold", 10);
        let scan = match scan_trash(days_threshold) {
            Ok(scan) => scan,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let size_to_free: u64 = scan.old_files.iter().map(|f| f.size).sum();
        let listed: Vec<Value> = scan
            .old_files
            .iter()
            .take(20)
            .map(|f| {
                json!({
                    "name": f.name,
                    "path": f.path.display().to_string(),
                    "size": f.size,
                    "modified": f.modified,
                    "days_old": f.days_old,
                })
            })
            .collect();

        ToolOutcome::success(json!({
            "trash_path": scan.trash_path.display().to_string(),
            "platform": std::env::consts::OS,
            "total_files": scan.total_files,
            "total_size": scan.total_size,
            "old_files_count": scan.old_files.len(),
            "old_files": listed,
            "size_to_free": size_to_free,
            "days_threshold": days_threshold,
            "scan_timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

/// Delete trash entries older than a day threshold.
pub struct CleanOldTrashFilesTool;

impl Tool for CleanOldTrashFilesTool {
    fn kind(&self) -> ToolKind {
        ToolKind::CleanOldTrashFiles
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Delete files from trash older than specified days")
            .with_param(ParamSpec::required(
                "days_threshold",
                ParamType::Integer,
                "Delete files older than this many days",
            ))
            .with_param(ParamSpec::optional(
                "confirm",
                ParamType::Boolean,
                "Whether to ask for confirmation (default: true)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let days_threshold = args.i64_or("days_threshold", 10);
        let scan = match scan_trash(days_threshold) {
            Ok(scan) => scan,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        if scan.old_files.is_empty() {
            return ToolOutcome::success(json!({
                "message": "No old files found to delete",
                "deleted_count": 0,
            }));
        }

        let mut deleted_files = Vec::new();
        let mut failed_deletions = Vec::new();
        let mut total_freed = 0u64;

        for file in &scan.old_files {
            let result = if file.path.is_dir() {
                fs::remove_dir_all(&file.path)
            } else {
                fs::remove_file(&file.path)
            };
            match result {
                Ok(()) => {
                    deleted_files.push(file.name.clone());
                    total_freed += file.size;
                }
                Err(e) => {
                    failed_deletions.push(json!({"file": file.name, "error": e.to_string()}));
                }
            }
        }

        ToolOutcome::success(json!({
            "deleted_count": deleted_files.len(),
            "failed_count": failed_deletions.len(),
            "deleted_files": deleted_files,
            "failed_deletions": failed_deletions,
            "space_freed_bytes": total_freed,
            "space_freed_mb": (total_freed as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Read / write / list
// ---------------------------------------------------------------------------

const MAX_READ_BYTES: u64 = 1024 * 1024;

pub(crate) struct FileContents {
    pub content: String,
    pub total_lines: usize,
    pub lines_read: usize,
    pub truncated: bool,
}

/// Shared read path with the size cap and line limit. Used by the read tool
/// and by the Python analyzer.
pub(crate) fn read_limited(path: &Path, max_lines: usize) -> Result<FileContents, FailureKind> {
    if !path.exists() {
        return Err(FailureKind::NotFound {
            resource: format!("file {}", path.display()),
        });
    }
    if !path.is_file() {
        return Err(FailureKind::InvalidInput {
            message: format!("path is not a file: {}", path.display()),
        });
    }

    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size > MAX_READ_BYTES {
        return Err(FailureKind::InvalidInput {
            message: format!("file too large: {size} bytes (max 1MB)"),
        });
    }

    let raw = fs::read(path).map_err(|e| FailureKind::Io {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    let text = String::from_utf8(raw).map_err(|_| FailureKind::InvalidInput {
        message: format!("cannot decode file as UTF-8: {}", path.display()),
    })?;

    let lines: Vec<&str> = text.lines().collect();
    let lines_read = lines.len().min(max_lines);
    Ok(FileContents {
        content: lines[..lines_read].join("\n"),
        total_lines: lines.len(),
        lines_read,
        truncated: lines.len() > max_lines,
    })
}

fn classify_extension(suffix: &str) -> Result<&'static str, FailureKind> {
    match suffix {
        "py" | "js" | "html" | "css" | "json" | "yaml" | "yml" | "rs" | "toml" => Ok("code"),
        "md" | "txt" | "log" | "" => Ok("text"),
        "jpg" | "jpeg" | "png" | "gif" | "pdf" | "zip" | "tar" | "gz" => {
            Err(FailureKind::InvalidInput {
                message: format!("binary file type not supported: .{suffix}"),
            })
        }
        _ => Ok("text"),
    }
}

/// Read a text file, capped in size and line count.
pub struct ReadFileContentTool;

impl Tool for ReadFileContentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ReadFileContent
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Read and analyze the content of a file")
            .with_param(ParamSpec::required(
                "file_path",
                ParamType::String,
                "Path to the file to read (supports ~ for home directory)",
            ))
            .with_param(ParamSpec::optional(
                "max_lines",
                ParamType::Integer,
                "Maximum number of lines to read (default: 500)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let path = expand_user(args.str_or("file_path", ""));
        let max_lines = args.i64_or("max_lines", 500).max(0) as usize;

        let suffix = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let file_type = match classify_extension(&suffix) {
            Ok(t) => t,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let contents = match read_limited(&path, max_lines) {
            Ok(c) => c,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let meta = fs::metadata(&path).ok();
        ToolOutcome::success(json!({
            "file_path": path.display().to_string(),
            "file_type": file_type,
            "file_extension": suffix,
            "total_lines": contents.total_lines,
            "content_lines_read": contents.lines_read,
            "content": contents.content,
            "file_size": meta.as_ref().map(|m| m.len()).unwrap_or(0),
            "last_modified": meta
                .and_then(|m| m.modified().ok())
                .map(iso)
                .unwrap_or_default(),
            "is_truncated": contents.truncated,
        }))
    }
}

/// Write a file, optionally backing up what was there.
pub struct WriteFileContentTool;

impl Tool for WriteFileContentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WriteFileContent
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Write content to a file with optional backup")
            .with_param(ParamSpec::required(
                "file_path",
                ParamType::String,
                "Path where to write the file",
            ))
            .with_param(ParamSpec::required(
                "content",
                ParamType::String,
                "Content to write to the file",
            ))
            .with_param(ParamSpec::optional(
                "backup",
                ParamType::Boolean,
                "Create backup of existing file (default: true)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let path = expand_user(args.str_or("file_path", ""));
        let content = args.str_or("content", "");
        let backup = args.bool_or("backup", true);

        let mut backup_path: Option<PathBuf> = None;
        if backup && path.exists() {
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            let suffix = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let candidate = path.with_extension(format!("backup_{timestamp}{suffix}"));
            if let Err(e) = fs::copy(&path, &candidate) {
                return ToolOutcome::failed(FailureKind::Io {
                    message: format!("failed to back up {}: {e}", path.display()),
                });
            }
            backup_path = Some(candidate);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent)
        {
            return ToolOutcome::failed(FailureKind::Io {
                message: format!("failed to create {}: {e}", parent.display()),
            });
        }

        if let Err(e) = fs::write(&path, content) {
            return ToolOutcome::failed(FailureKind::Io {
                message: format!("failed to write {}: {e}", path.display()),
            });
        }

        ToolOutcome::success(json!({
            "file_path": path.display().to_string(),
            "backup_created": backup_path.is_some(),
            "backup_path": backup_path.map(|p| p.display().to_string()),
            "content_length": content.len(),
            "lines_written": content.matches('\n').count() + 1,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

/// List a directory with per-entry details.
pub struct ListDirectoryContentsTool;

impl Tool for ListDirectoryContentsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ListDirectoryContents
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "List files and directories in a given path")
            .with_param(ParamSpec::optional(
                "dir_path",
                ParamType::String,
                "Directory path to list (default: current directory)",
            ))
            .with_param(ParamSpec::optional(
                "show_hidden",
                ParamType::Boolean,
                "Show hidden files starting with . (default: false)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let path = expand_user(args.str_or("dir_path", "."));
        let show_hidden = args.bool_or("show_hidden", false);

        if !path.exists() {
            return ToolOutcome::failed(FailureKind::NotFound {
                resource: format!("directory {}", path.display()),
            });
        }
        if !path.is_dir() {
            return ToolOutcome::failed(FailureKind::InvalidInput {
                message: format!("path is not a directory: {}", path.display()),
            });
        }

        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) => {
                return ToolOutcome::failed(FailureKind::Io {
                    message: format!("failed to read {}: {e}", path.display()),
                });
            }
        };

        let mut files = Vec::new();
        let mut directories = Vec::new();
        let mut total_size = 0u64;

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_hidden && name.starts_with('.') {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };

            let is_dir = meta.is_dir();
            let size = if is_dir { 0 } else { meta.len() };
            let info = json!({
                "name": name,
                "path": entry.path().display().to_string(),
                "is_directory": is_dir,
                "size": size,
                "modified": meta.modified().ok().map(iso).unwrap_or_default(),
                "readonly": meta.permissions().readonly(),
            });

            if is_dir {
                directories.push(info);
            } else {
                total_size += size;
                files.push(info);
            }
        }

        let by_name = |a: &Value, b: &Value| {
            a["name"]
                .as_str()
                .unwrap_or_default()
                .cmp(b["name"].as_str().unwrap_or_default())
        };
        files.sort_by(by_name);
        directories.sort_by(by_name);

        ToolOutcome::success(json!({
            "directory_path": path.display().to_string(),
            "total_files": files.len(),
            "total_directories": directories.len(),
            "total_size": total_size,
            "files": files,
            "directories": directories,
            "show_hidden": show_hidden,
            "scan_timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Find / search
// ---------------------------------------------------------------------------

/// Paths under `base` whose base-relative form matches `glob`.
fn glob_walk(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, FailureKind> {
    // `*` must not cross directory separators; `**` handles recursion.
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| FailureKind::InvalidInput {
            message: format!("invalid glob pattern '{pattern}': {e}"),
        })?
        .compile_matcher();

    let mut matched = Vec::new();
    for entry in WalkDir::new(base).into_iter().filter_map(Result::ok) {
        let Ok(relative) = entry.path().strip_prefix(base) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        if matcher.is_match(relative) {
            matched.push(entry.path().to_path_buf());
        }
    }
    Ok(matched)
}

/// Find files matching a glob pattern.
pub struct FindFilesTool;

impl Tool for FindFilesTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FindFiles
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Find files matching a glob pattern recursively.")
            .with_param(ParamSpec::required(
                "pattern",
                ParamType::String,
                "The glob pattern to match (e.g., '**/*.py')",
            ))
            .with_param(ParamSpec::optional(
                "base_path",
                ParamType::String,
                "The base path to search from (default: current directory)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let pattern = args.str_or("pattern", "");
        let base = expand_user(args.str_or("base_path", "."));

        match glob_walk(&base, pattern) {
            Ok(paths) => ToolOutcome::success(json!({
                "files": paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>(),
            })),
            Err(reason) => ToolOutcome::failed(reason),
        }
    }
}

/// Search for a regex inside glob-matched files.
pub struct SearchTextTool;

impl Tool for SearchTextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SearchText
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Search for a text pattern in files matching a glob pattern.",
        )
        .with_param(ParamSpec::required(
            "pattern",
            ParamType::String,
            "The text pattern to search for (can be a regex).",
        ))
        .with_param(ParamSpec::required(
            "file_pattern",
            ParamType::String,
            "The glob pattern for files to search (e.g., '**/*.py').",
        ))
        .with_param(ParamSpec::optional(
            "base_path",
            ParamType::String,
            "The base path to search from (default: current directory).",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let pattern = args.str_or("pattern", "");
        let file_pattern = args.str_or("file_pattern", "");
        let base = expand_user(args.str_or("base_path", "."));

        let regex = match regex::Regex::new(pattern) {
            Ok(r) => r,
            Err(e) => {
                return ToolOutcome::failed(FailureKind::InvalidInput {
                    message: format!("invalid search pattern '{pattern}': {e}"),
                });
            }
        };

        let files = match glob_walk(&base, file_pattern) {
            Ok(paths) => paths,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let mut results = Vec::new();
        for file in files.iter().filter(|p| p.is_file()) {
            // Unreadable or non-UTF-8 files are skipped, not fatal.
            let Ok(text) = fs::read_to_string(file) else {
                tracing::debug!(path = %file.display(), "Skipping unreadable file");
                continue;
            };
            for (idx, line) in text.lines().enumerate() {
                if regex.is_match(line) {
                    results.push(json!({
                        "file_path": file.display().to_string(),
                        "line_number": idx + 1,
                        "line_content": line.trim(),
                    }));
                }
            }
        }

        ToolOutcome::success(json!({ "results": results }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use tempfile::tempdir;

    fn args(json: Value) -> ToolArgs {
        match json {
            Value::Object(map) => ToolArgs::new(map),
            _ => ToolArgs::new(Map::new()),
        }
    }

    #[test]
    fn read_missing_file_fails_not_found() {
        let outcome = ReadFileContentTool.call(args(json!({"file_path": "/no/such/file.txt"})));
        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureKind::NotFound { .. })
        ));
    }

    #[test]
    fn read_respects_line_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "one\ntwo\nthree\nfour\n").unwrap();

        let outcome = ReadFileContentTool.call(args(json!({
            "file_path": path.display().to_string(),
            "max_lines": 2,
        })));
        let payload = outcome.payload().unwrap();
        assert_eq!(payload["content"], "one\ntwo");
        assert_eq!(payload["total_lines"], 4);
        assert_eq!(payload["is_truncated"], true);
    }

    #[test]
    fn read_rejects_binary_extensions() {
        let outcome = ReadFileContentTool.call(args(json!({"file_path": "photo.png"})));
        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureKind::InvalidInput { .. })
        ));
    }

    #[test]
    fn write_creates_backup_of_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();

        let outcome = WriteFileContentTool.call(args(json!({
            "file_path": path.display().to_string(),
            "content": "new",
        })));
        let payload = outcome.payload().unwrap();
        assert_eq!(payload["backup_created"], true);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");

        let backup = PathBuf::from(payload["backup_path"].as_str().unwrap());
        assert_eq!(fs::read_to_string(backup).unwrap(), "old");
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deep/out.txt");

        let outcome = WriteFileContentTool.call(args(json!({
            "file_path": path.display().to_string(),
            "content": "hello",
            "backup": false,
        })));
        assert!(outcome.is_success());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn list_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("visible.txt"), "a").unwrap();
        fs::write(dir.path().join(".hidden"), "b").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let outcome = ListDirectoryContentsTool.call(args(json!({
            "dir_path": dir.path().display().to_string(),
        })));
        let payload = outcome.payload().unwrap();
        assert_eq!(payload["total_files"], 1);
        assert_eq!(payload["total_directories"], 1);

        let outcome = ListDirectoryContentsTool.call(args(json!({
            "dir_path": dir.path().display().to_string(),
            "show_hidden": true,
        })));
        assert_eq!(outcome.payload().unwrap()["total_files"], 2);
    }

    #[test]
    fn find_files_matches_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/deep.py"), "").unwrap();
        fs::write(dir.path().join("top.py"), "").unwrap();
        fs::write(dir.path().join("other.txt"), "").unwrap();

        let outcome = FindFilesTool.call(args(json!({
            "pattern": "**/*.py",
            "base_path": dir.path().display().to_string(),
        })));
        let files = outcome.payload().unwrap()["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn search_text_reports_line_numbers() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("code.py"), "import os\nx = 1\nimport sys\n").unwrap();

        let outcome = SearchTextTool.call(args(json!({
            "pattern": r"^import\s",
            "file_pattern": "*.py",
            "base_path": dir.path().display().to_string(),
        })));
        let results = outcome.payload().unwrap()["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["line_number"], 1);
        assert_eq!(results[1]["line_number"], 3);
    }

    #[test]
    fn search_text_rejects_bad_regex() {
        let outcome = SearchTextTool.call(args(json!({
            "pattern": "(unclosed",
            "file_pattern": "*.txt",
        })));
        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureKind::InvalidInput { .. })
        ));
    }
}
