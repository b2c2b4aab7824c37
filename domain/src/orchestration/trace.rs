//! Debug trace of one orchestrated turn.

use crate::tool::name::AliasMap;
use crate::tool::value_objects::ToolExecutionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which branch of the two-pass protocol the turn took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// The model answered directly
    NoToolCalls,
    /// Tools ran and a final model call produced the answer
    ToolCallsExecuted,
}

impl TurnPhase {
    pub fn as_str(&self) -> &str {
        match self {
            TurnPhase::NoToolCalls => "no_tool_calls",
            TurnPhase::ToolCallsExecuted => "tool_calls_executed",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a caller needs to debug a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnTrace {
    pub phase: TurnPhase,
    /// Canonical names of the tools offered to the model
    #[serde(default)]
    pub selected_tools: Vec<String>,
    pub alias_map: AliasMap,
    /// Raw provider payload of the first model call
    pub first_response: Value,
    /// Raw provider payload of the final model call, if one was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<Value>,
    #[serde(default)]
    pub tool_results: Vec<ToolExecutionResult>,
    /// Set when a batch execution failed and calls were re-run one by one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_error: Option<String>,
}

impl TurnTrace {
    pub fn direct(selected_tools: Vec<String>, alias_map: AliasMap, first_response: Value) -> Self {
        Self {
            phase: TurnPhase::NoToolCalls,
            selected_tools,
            alias_map,
            first_response,
            final_response: None,
            tool_results: Vec::new(),
            batch_error: None,
        }
    }

    pub fn with_tool_results(
        mut self,
        tool_results: Vec<ToolExecutionResult>,
        final_response: Value,
    ) -> Self {
        self.phase = TurnPhase::ToolCallsExecuted;
        self.tool_results = tool_results;
        self.final_response = Some(final_response);
        self
    }

    pub fn with_batch_error(mut self, error: Option<String>) -> Self {
        self.batch_error = error;
        self
    }
}
