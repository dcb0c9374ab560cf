//! System tools: host inspection, script and command execution,
//! notifications.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::json;
use sysinfo::{Disks, System};

use factotum_core::schema::{ParamSpec, ParamType, ToolArgs, ToolSpec};
use factotum_core::tool::{FailureKind, Tool, ToolKind, ToolOutcome};

use crate::fs::expand_user;

// ---------------------------------------------------------------------------
// Bounded subprocess execution
// ---------------------------------------------------------------------------

struct CommandCapture {
    stdout: String,
    stderr: String,
    exit_code: i32,
    success: bool,
    elapsed_secs: f64,
}

/// Run a command with piped output and a hard deadline.
///
/// Polls `try_wait` instead of blocking in `wait`, so the deadline can kill
/// a stuck child. A timeout is reported as a recoverable failure, never a
/// process-level hang.
fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
    label: &str,
) -> Result<CommandCapture, FailureKind> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| FailureKind::Io {
        message: format!("failed to spawn {label}: {e}"),
    })?;

    fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut pipe) = pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        })
    }
    let stdout_handle = drain(child.stdout.take());
    let stderr_handle = drain(child.stderr.take());

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = stdout_handle
                    .join()
                    .map(|b| String::from_utf8_lossy(&b).into_owned())
                    .unwrap_or_default();
                let stderr = stderr_handle
                    .join()
                    .map(|b| String::from_utf8_lossy(&b).into_owned())
                    .unwrap_or_default();
                return Ok(CommandCapture {
                    stdout,
                    stderr,
                    exit_code: status.code().unwrap_or(-1),
                    success: status.success(),
                    elapsed_secs: (start.elapsed().as_secs_f64() * 100.0).round() / 100.0,
                });
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FailureKind::Timeout {
                        operation: format!("{label} after {} seconds", timeout.as_secs()),
                    });
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(FailureKind::Io {
                    message: format!("failed to poll {label}: {e}"),
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// get_system_info
// ---------------------------------------------------------------------------

/// Report platform, user and resource information.
pub struct GetSystemInfoTool;

impl Tool for GetSystemInfoTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GetSystemInfo
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Get current system information including platform, resources, and user details",
        )
    }

    fn call(&self, _args: ToolArgs) -> ToolOutcome {
        let mut sys = System::new_all();
        // Two refreshes with the minimum interval between them make the CPU
        // usage figure meaningful.
        sys.refresh_cpu_usage();
        thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        let user_var = if cfg!(target_os = "windows") {
            "USERNAME"
        } else {
            "USER"
        };

        let disk_root = if cfg!(target_os = "windows") {
            "C:\\"
        } else {
            "/"
        };
        let disks = Disks::new_with_refreshed_list();
        let disk_usage = disks
            .iter()
            .find(|d| d.mount_point().to_string_lossy() == disk_root)
            .or_else(|| disks.iter().next())
            .map(|disk| {
                let total = disk.total_space();
                let free = disk.available_space();
                let used = total.saturating_sub(free);
                json!({
                    "total": total,
                    "used": used,
                    "free": free,
                    "percent": if total > 0 {
                        used as f64 / total as f64 * 100.0
                    } else {
                        0.0
                    },
                })
            });

        let memory_total = sys.total_memory();
        let memory_available = sys.available_memory();

        ToolOutcome::success(json!({
            "platform": std::env::consts::OS,
            "architecture": std::env::consts::ARCH,
            "hostname": System::host_name().unwrap_or_default(),
            "os_version": System::long_os_version().unwrap_or_default(),
            "current_user": std::env::var(user_var).unwrap_or_default(),
            "current_directory": std::env::current_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "home_directory": dirs::home_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "cpu_percent": sys.global_cpu_usage(),
            "memory_total": memory_total,
            "memory_available": memory_available,
            "memory_percent": if memory_total > 0 {
                (memory_total - memory_available) as f64 / memory_total as f64 * 100.0
            } else {
                0.0
            },
            "disk_usage": disk_usage,
            "timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

// ---------------------------------------------------------------------------
// run_python_script
// ---------------------------------------------------------------------------

fn python_command() -> &'static str {
    if cfg!(target_os = "windows") {
        "python"
    } else {
        "python3"
    }
}

/// Run a Python script with captured output and a timeout.
pub struct RunPythonScriptTool;

impl Tool for RunPythonScriptTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RunPythonScript
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Execute a Python script and capture output and errors")
            .with_param(ParamSpec::required(
                "script_path",
                ParamType::String,
                "Path to the Python script to execute",
            ))
            .with_param(ParamSpec::optional(
                "timeout",
                ParamType::Integer,
                "Maximum execution time in seconds (default: 30)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let path = expand_user(args.str_or("script_path", ""));
        let timeout = Duration::from_secs(args.i64_or("timeout", 30).max(1) as u64);

        if !path.exists() {
            return ToolOutcome::failed(FailureKind::NotFound {
                resource: format!("script {}", path.display()),
            });
        }

        let mut cmd = Command::new(python_command());
        cmd.arg(&path);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            cmd.current_dir(parent);
        }

        match run_with_timeout(&mut cmd, timeout, "python script") {
            Ok(capture) => ToolOutcome::success(json!({
                "script_path": path.display().to_string(),
                "platform": std::env::consts::OS,
                "python_command": python_command(),
                "exit_code": capture.exit_code,
                "stdout": capture.stdout,
                "stderr": capture.stderr,
                "execution_time": capture.elapsed_secs,
                "success": capture.success,
                "timestamp": Utc::now().to_rfc3339(),
            })),
            Err(reason) => ToolOutcome::failed(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// analyze_python_code
// ---------------------------------------------------------------------------

/// Line-based structural analysis of a Python file.
pub struct AnalyzePythonCodeTool;

impl Tool for AnalyzePythonCodeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::AnalyzePythonCode
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Analyze Python code for syntax errors, issues, and suggestions",
        )
        .with_param(ParamSpec::required(
            "file_path",
            ParamType::String,
            "Path to the Python file to analyze",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let path = expand_user(args.str_or("file_path", ""));
        let contents = match crate::fs::read_limited(&path, 500) {
            Ok(c) => c,
            Err(reason) => return ToolOutcome::failed(reason),
        };

        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        let mut imports = Vec::new();
        let mut functions = Vec::new();
        let mut classes = Vec::new();

        for (idx, line) in contents.content.lines().enumerate() {
            let number = idx + 1;
            let stripped = line.trim();

            if stripped.starts_with("import ") || stripped.starts_with("from ") {
                imports.push(stripped.to_string());
            }
            if stripped.starts_with("def ") {
                functions.push(stripped.to_string());
            }
            if stripped.starts_with("class ") {
                classes.push(stripped.to_string());
            }

            if line.contains("print(") && !stripped.starts_with('#') {
                suggestions.push(format!(
                    "Line {number}: Consider using logging instead of print statements"
                ));
            }
            if stripped == "pass" && number > 1 {
                issues.push(format!(
                    "Line {number}: Empty pass statement - might need implementation"
                ));
            }
            let upper = line.to_uppercase();
            if upper.contains("TODO") || upper.contains("FIXME") {
                issues.push(format!("Line {number}: TODO/FIXME comment found"));
            }
        }

        functions.truncate(10);

        ToolOutcome::success(json!({
            "file_path": path.display().to_string(),
            "total_lines": contents.total_lines,
            "imports_count": imports.len(),
            "functions_count": functions.len(),
            "classes_count": classes.len(),
            // Structural checks only; no interpreter is invoked.
            "syntax_checked": false,
            "issues": issues,
            "suggestions": suggestions,
            "imports": imports,
            "functions": functions,
            "classes": classes,
            "analysis_timestamp": Utc::now().to_rfc3339(),
        }))
    }
}

// ---------------------------------------------------------------------------
// send_system_notification
// ---------------------------------------------------------------------------

/// Desktop notification via the platform's native mechanism.
pub struct SendSystemNotificationTool;

impl Tool for SendSystemNotificationTool {
    fn kind(&self) -> ToolKind {
        ToolKind::SendSystemNotification
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Send a system notification")
            .with_param(ParamSpec::required(
                "message",
                ParamType::String,
                "Notification message content",
            ))
            .with_param(ParamSpec::optional(
                "title",
                ParamType::String,
                "Notification title (default: 'Factotum')",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let message = args.str_or("message", "");
        let title = args.str_or("title", "Factotum");

        let mut cmd = if cfg!(target_os = "macos") {
            let script = format!(r#"display notification "{message}" with title "{title}""#);
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(script);
            cmd
        } else if cfg!(target_os = "linux") {
            let mut cmd = Command::new("notify-send");
            cmd.arg(title).arg(message);
            cmd
        } else if cfg!(target_os = "windows") {
            let script = format!(
                "New-BurntToastNotification -Text \"{title}\", \"{message}\" -ErrorAction SilentlyContinue"
            );
            let mut cmd = Command::new("powershell");
            cmd.arg("-Command").arg(script);
            cmd
        } else {
            return ToolOutcome::failed(FailureKind::Unsupported {
                message: format!("notifications not supported on {}", std::env::consts::OS),
            });
        };

        match run_with_timeout(&mut cmd, Duration::from_secs(10), "notification command") {
            Ok(capture) => {
                let mut payload = json!({
                    "message": message,
                    "title": title,
                    "platform": std::env::consts::OS,
                    "success": capture.success,
                    "timestamp": Utc::now().to_rfc3339(),
                });
                if !capture.success {
                    payload["stderr"] = json!(capture.stderr);
                }
                ToolOutcome::success(payload)
            }
            Err(reason) => ToolOutcome::failed(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// execute_cli_command
// ---------------------------------------------------------------------------

/// Run a command line with captured output and a timeout. No shell is
/// involved on Unix; the command is split on whitespace.
pub struct ExecuteCliCommandTool;

impl Tool for ExecuteCliCommandTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ExecuteCliCommand
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.kind(), "Execute CLI command with proper shell handling")
            .with_param(ParamSpec::required(
                "command",
                ParamType::String,
                "The command to execute",
            ))
            .with_param(ParamSpec::optional(
                "timeout",
                ParamType::Integer,
                "Maximum execution time in seconds (default: 30)",
            ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let command = args.str_or("command", "");
        let timeout = Duration::from_secs(args.i64_or("timeout", 30).max(1) as u64);

        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("powershell");
            cmd.arg("-Command").arg(command);
            cmd
        } else {
            let mut parts = command.split_whitespace();
            let Some(program) = parts.next() else {
                return ToolOutcome::failed(FailureKind::InvalidInput {
                    message: "empty command".to_string(),
                });
            };
            let mut cmd = Command::new(program);
            cmd.args(parts);
            cmd
        };

        match run_with_timeout(&mut cmd, timeout, "command") {
            Ok(capture) => ToolOutcome::success(json!({
                "command": command,
                "platform": std::env::consts::OS,
                "exit_code": capture.exit_code,
                "stdout": capture.stdout.trim(),
                "stderr": capture.stderr.trim(),
                "execution_time": capture.elapsed_secs,
                "success": capture.success,
                "working_directory": std::env::current_dir()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                "timestamp": Utc::now().to_rfc3339(),
            })),
            Err(reason) => ToolOutcome::failed(reason),
        }
    }
}
