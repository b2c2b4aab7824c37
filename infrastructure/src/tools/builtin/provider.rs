//! Plumbing shared by the builtin tool modules.
//!
//! Builtin tools are plain functions. [`FnTool`] adapts one to the [`Tool`]
//! trait together with the state it needs (the sandbox for filesystem tools,
//! nothing for the rest).

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolOutput};

use crate::tools::sandbox::{PathSandbox, SandboxError};

/// Signature of a builtin tool body.
pub(crate) type ToolFn<S> = fn(&S, &ToolArguments, &ToolContext) -> Result<ToolOutput, ToolError>;

/// A builtin tool: a name, some state, and a function.
pub(crate) struct FnTool<S> {
    name: &'static str,
    state: S,
    run: ToolFn<S>,
}

impl<S: Send + Sync + 'static> FnTool<S> {
    pub(crate) fn arc(name: &'static str, state: S, run: ToolFn<S>) -> Arc<dyn Tool> {
        Arc::new(Self { name, state, run })
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> Tool for FnTool<S> {
    fn name(&self) -> &str {
        self.name
    }

    async fn invoke(
        &self,
        args: &ToolArguments,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        (self.run)(&self.state, args, ctx)
    }
}

/// Resolve a tool argument through the sandbox, mapping refusals to tool errors.
pub(crate) fn sandboxed(sandbox: &PathSandbox, path: &str) -> Result<PathBuf, ToolError> {
    sandbox.resolve(path).map_err(|e| match e {
        SandboxError::AbsolutePath(_) | SandboxError::Traversal(_) => ToolError::permission_denied(
            format!("The path '{}' is invalid or outside the allowed directory.", path),
        ),
        SandboxError::Unconfigured => ToolError::execution_failed(
            "File I/O is disabled because no sandbox root is configured.",
        ),
        SandboxError::Io { .. } => ToolError::execution_failed(e.to_string()),
    })
}

/// Map an I/O error from a tool body, keeping permission problems distinct.
pub(crate) fn io_error(action: &str, path: &str, e: std::io::Error) -> ToolError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        ToolError::permission_denied(format!("Permission denied: '{}'", path))
    } else {
        ToolError::execution_failed(format!("Could not {} '{}'. Reason: {}", action, path, e))
    }
}
