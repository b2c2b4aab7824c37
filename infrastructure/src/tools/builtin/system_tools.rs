//! System tools: system.execute_command
//!
//! Commands are split into words and run directly, never through a shell,
//! so the blocklist applies to the program that actually starts. The working
//! directory is resolved through the [`PathSandbox`].

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use toolrelay_domain::{
    Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput, truncate,
};
use tracing::{debug, warn};

use super::provider::sandboxed;
use crate::tools::sandbox::PathSandbox;

pub const MODULE_ID: &str = "system_tools";
pub const EXECUTE_COMMAND: &str = "system.execute_command";

/// Default timeout for command execution (60 seconds)
const DEFAULT_TIMEOUT_SECS: i64 = 60;

/// Longest timeout a caller may ask for (10 minutes)
const MAX_TIMEOUT_SECS: i64 = 600;

/// Maximum characters kept from each output stream
const MAX_STREAM_CHARS: usize = 100_000;

/// Programs that are never started.
const BLOCKED_COMMANDS: &[&str] = &["sudo", "rm", "mv"];

/// Command execution confined to the sandbox.
#[derive(Debug, Clone)]
pub struct SystemTools {
    sandbox: Arc<PathSandbox>,
}

impl SystemTools {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

impl ToolModule for SystemTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        Some(vec![Arc::new(ExecuteCommand {
            sandbox: self.sandbox.clone(),
        })])
    }
}

struct ExecuteCommand {
    sandbox: Arc<PathSandbox>,
}

#[async_trait]
impl Tool for ExecuteCommand {
    fn name(&self) -> &str {
        EXECUTE_COMMAND
    }

    async fn invoke(&self, args: &ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let command = args.require_string("command")?;
        let timeout_secs = args.get_i64("timeout").unwrap_or(DEFAULT_TIMEOUT_SECS);
        if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ToolError::invalid_argument(format!(
                "timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if self.sandbox.root().is_none() {
            return Err(ToolError::execution_failed(
                "Command execution is disabled because no sandbox root is configured.",
            ));
        }
        let working_dir = args.get_string("working_dir").unwrap_or(".");
        let dir = sandboxed(&self.sandbox, working_dir)?;
        if !dir.is_dir() {
            return Err(ToolError::invalid_argument(format!(
                "The working directory '{}' is not valid.",
                working_dir
            )));
        }

        let words = shell_words::split(command)
            .map_err(|e| ToolError::invalid_argument(format!("Could not parse command: {}", e)))?;
        let Some((program, rest)) = words.split_first() else {
            return Err(ToolError::invalid_argument("The command is empty."));
        };
        let program_name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.clone());
        if BLOCKED_COMMANDS.contains(&program_name.as_str()) {
            warn!(command, "Blocked command");
            return Err(ToolError::permission_denied(format!(
                "For security reasons, the command '{}' is blocked.",
                program_name
            )));
        }

        debug!(command, working_dir, timeout_secs, "Executing command");
        let child = Command::new(program)
            .args(rest)
            .current_dir(&dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ToolError::not_found(format!(
                    "Command '{}' not found. Is it installed and in the PATH?",
                    program
                )),
                _ => ToolError::execution_failed(format!(
                    "Failed to start '{}'. Reason: {}",
                    program, e
                )),
            })?;

        // Dropping the future on timeout kills the child
        let output = tokio::time::timeout(
            Duration::from_secs(timeout_secs as u64),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| {
            ToolError::execution_failed(format!(
                "Command '{}' timed out after {} seconds.",
                command, timeout_secs
            ))
        })?
        .map_err(|e| ToolError::execution_failed(format!("Command '{}' failed: {}", command, e)))?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let mut report = format!("Exit Code: {}\n", exit_code);
        if !stdout.is_empty() {
            report.push_str(&format!(
                "--- STDOUT ---\n{}\n",
                truncate(&stdout, MAX_STREAM_CHARS)
            ));
        }
        if !stderr.is_empty() {
            report.push_str(&format!(
                "--- STDERR ---\n{}\n",
                truncate(&stderr, MAX_STREAM_CHARS)
            ));
        }
        Ok(ToolOutput::text(report.trim_end()))
    }
}
