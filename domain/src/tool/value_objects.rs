//! Tool domain value objects: immutable output and error types
//!
//! A tool body returns a [`ToolOutput`] or a [`ToolError`]. The invoker folds
//! either into a [`ToolExecutionResult`], the uniform shape that flows back
//! into the conversation and across the tool-server wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error reported by a tool body.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Missing/wrong parameters, model can fix |
/// | `NOT_FOUND` | Unknown tool or resource |
/// | `PERMISSION_DENIED` | Path rejected by the sandbox or by the OS |
/// | `EXECUTION_FAILED` | Runtime failure (I/O error, HTTP error) |
/// | `INTERNAL` | Tool panicked or broke an invariant |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new("PERMISSION_DENIED", message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// What a tool body produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain text, passed to the model unchanged
    Text(String),
    /// Structured output, serialized to a JSON string for the model
    Json(Value),
    /// The tool needs the human to answer before work can continue
    NeedsInput {
        question: String,
        options: Vec<String>,
    },
}

impl ToolOutput {
    pub fn text(s: impl Into<String>) -> Self {
        ToolOutput::Text(s.into())
    }
}

impl From<String> for ToolOutput {
    fn from(s: String) -> Self {
        ToolOutput::Text(s)
    }
}

impl From<&str> for ToolOutput {
    fn from(s: &str) -> Self {
        ToolOutput::Text(s.to_string())
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success { content: String },
    Failure { error: String },
    NeedsInput { question: String, options: Vec<String> },
}

/// Uniform result of invoking a tool.
///
/// Invocation never panics or errors to its caller: every problem, from an
/// unknown name to a panicking tool body, ends up here as a failure.
///
/// On the wire the result is a flat object with `ok`, `content` and `error`,
/// plus `status: "needs_input"` with `question`/`options` for that outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireResult", into = "WireResult")]
pub struct ToolExecutionResult {
    pub tool_call_id: Option<String>,
    pub function_name: String,
    pub outcome: ExecutionOutcome,
    pub duration_ms: u64,
}

impl ToolExecutionResult {
    pub fn success(function_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_outcome(
            function_name,
            ExecutionOutcome::Success {
                content: content.into(),
            },
        )
    }

    pub fn failure(function_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self::with_outcome(
            function_name,
            ExecutionOutcome::Failure {
                error: error.into(),
            },
        )
    }

    pub fn needs_input(
        function_name: impl Into<String>,
        question: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self::with_outcome(
            function_name,
            ExecutionOutcome::NeedsInput {
                question: question.into(),
                options,
            },
        )
    }

    fn with_outcome(function_name: impl Into<String>, outcome: ExecutionOutcome) -> Self {
        Self {
            tool_call_id: None,
            function_name: function_name.into(),
            outcome,
            duration_ms: 0,
        }
    }

    pub fn with_tool_call_id(mut self, id: Option<String>) -> Self {
        self.tool_call_id = id;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// True for success and needs-input outcomes.
    pub fn ok(&self) -> bool {
        !matches!(self.outcome, ExecutionOutcome::Failure { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            ExecutionOutcome::Success { content } => Some(content),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ExecutionOutcome::Failure { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_needs_input(&self) -> bool {
        matches!(self.outcome, ExecutionOutcome::NeedsInput { .. })
    }

    /// Content of the `tool` turn appended to the conversation.
    ///
    /// Success passes the content through, a pending question becomes a
    /// small status object, and a failure is the whole result as JSON.
    pub fn tool_message_content(&self) -> String {
        match &self.outcome {
            ExecutionOutcome::Success { content } => content.clone(),
            ExecutionOutcome::NeedsInput { question, options } => serde_json::json!({
                "status": "needs_input",
                "question": question,
                "options": options,
            })
            .to_string(),
            ExecutionOutcome::Failure { error } => serde_json::to_string(self)
                .unwrap_or_else(|_| serde_json::json!({ "error": error }).to_string()),
        }
    }
}

/// Flat transport shape shared with the tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, alias = "function_name")]
    function: String,
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    question: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    #[serde(default)]
    duration_ms: u64,
}

impl From<WireResult> for ToolExecutionResult {
    fn from(wire: WireResult) -> Self {
        let outcome = if wire.status.as_deref() == Some("needs_input") {
            ExecutionOutcome::NeedsInput {
                question: wire.question.unwrap_or_default(),
                options: wire.options,
            }
        } else if wire.ok {
            ExecutionOutcome::Success {
                content: wire.content.unwrap_or_default(),
            }
        } else {
            ExecutionOutcome::Failure {
                error: wire.error.unwrap_or_else(|| "Unknown error".to_string()),
            }
        };

        Self {
            tool_call_id: wire.tool_call_id,
            function_name: wire.function,
            outcome,
            duration_ms: wire.duration_ms,
        }
    }
}

impl From<ToolExecutionResult> for WireResult {
    fn from(result: ToolExecutionResult) -> Self {
        let mut wire = WireResult {
            tool_call_id: result.tool_call_id,
            function: result.function_name,
            ok: true,
            status: None,
            content: None,
            error: None,
            question: None,
            options: Vec::new(),
            duration_ms: result.duration_ms,
        };
        match result.outcome {
            ExecutionOutcome::Success { content } => wire.content = Some(content),
            ExecutionOutcome::Failure { error } => {
                wire.ok = false;
                wire.error = Some(error);
            }
            ExecutionOutcome::NeedsInput { question, options } => {
                wire.status = Some("needs_input".to_string());
                wire.question = Some(question);
                wire.options = options;
            }
        }
        wire
    }
}
