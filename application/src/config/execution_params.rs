//! Execution parameters: tool selection and turn control.
//!
//! [`ExecutionParams`] groups the static parameters read by
//! [`ToolSelector`](crate::use_cases::select_tools::ToolSelector) and
//! [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).
//! These are application-layer concerns, not domain policy.

use crate::ports::llm_gateway::ToolChoice;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolrelay_domain::{DEFAULT_RECENT_TURNS, DEFAULT_TOP_K, core_tool_names};

/// Selection and turn control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Number of ranked tools requested from discovery.
    pub k_tools: usize,
    /// Trailing turns scanned for the tactical part of the discovery query.
    pub recent_turns: usize,
    /// Tools offered on every turn when present in the catalog.
    pub core_tools: Vec<String>,
    /// Cache lifetime when discovery does not supply one. Zero disables caching.
    pub cache_ttl: Duration,
    /// Use batch execution when more than one call is requested.
    pub try_batch_execute: bool,
    /// Let batch calls run concurrently.
    pub parallel_batch: bool,
    /// Tool-choice policy for the first model call.
    pub tool_choice: ToolChoice,
    /// Prepended to the conversation unless it already starts with a system turn.
    pub system_prompt: Option<String>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            k_tools: DEFAULT_TOP_K,
            recent_turns: DEFAULT_RECENT_TURNS,
            core_tools: core_tool_names(),
            cache_ttl: Duration::from_secs(300),
            try_batch_execute: true,
            parallel_batch: false,
            tool_choice: ToolChoice::Auto,
            system_prompt: None,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_k_tools(mut self, k: usize) -> Self {
        self.k_tools = k;
        self
    }

    pub fn with_recent_turns(mut self, turns: usize) -> Self {
        self.recent_turns = turns;
        self
    }

    pub fn with_core_tools(mut self, tools: Vec<String>) -> Self {
        self.core_tools = tools;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_batch(mut self, try_batch_execute: bool, parallel: bool) -> Self {
        self.try_batch_execute = try_batch_execute;
        self.parallel_batch = parallel;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}
