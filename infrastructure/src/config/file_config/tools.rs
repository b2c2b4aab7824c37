//! Tools configuration from TOML (`[tools]` section)
//!
//! Controls the sandbox, where tool descriptions come from, and how tools
//! are selected and executed.
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! sandbox_root = "./workspace"
//! k_tools = 5
//! discovery = "embedding"
//! executor = "local"
//! parallel_batch = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toolrelay_application::ExecutionParams;
use toolrelay_domain::{DEFAULT_RECENT_TURNS, DEFAULT_TOP_K, core_tool_names};

use super::issues::{ConfigIssue, ConfigIssueCode};

/// How tools are selected for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryBackend {
    /// Embedding ranker over the local catalog
    Embedding,
    /// Remote tool server `/discover`
    ToolServer,
    /// Core tools only
    None,
}

/// Where tool calls run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorBackend {
    Local,
    ToolServer,
}

/// Raw `[tools]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Root directory for file tools; unset disables them
    pub sandbox_root: Option<PathBuf>,
    /// Directory of `<module>.json` descriptions overriding the embedded ones
    pub definitions_dir: Option<PathBuf>,
    /// Tools offered on every turn
    pub core_tools: Vec<String>,
    pub k_tools: usize,
    pub recent_turns: usize,
    /// Discovery cache lifetime; zero disables caching
    pub cache_ttl_secs: u64,
    pub try_batch_execute: bool,
    pub parallel_batch: bool,
    /// "embedding", "toolserver" or "none"
    pub discovery: String,
    /// "local" or "toolserver"
    pub executor: String,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            sandbox_root: None,
            definitions_dir: None,
            core_tools: core_tool_names(),
            k_tools: DEFAULT_TOP_K,
            recent_turns: DEFAULT_RECENT_TURNS,
            cache_ttl_secs: 300,
            try_batch_execute: true,
            parallel_batch: false,
            discovery: "embedding".to_string(),
            executor: "local".to_string(),
        }
    }
}

impl FileToolsConfig {
    pub fn parse_discovery(&self) -> (DiscoveryBackend, Vec<ConfigIssue>) {
        match self.discovery.to_lowercase().as_str() {
            "embedding" | "rag" => (DiscoveryBackend::Embedding, Vec::new()),
            "toolserver" | "tool_server" => (DiscoveryBackend::ToolServer, Vec::new()),
            "none" | "core" => (DiscoveryBackend::None, Vec::new()),
            other => (
                DiscoveryBackend::Embedding,
                vec![invalid_enum(
                    "tools.discovery",
                    other,
                    &["embedding", "toolserver", "none"],
                    "embedding",
                )],
            ),
        }
    }

    pub fn parse_executor(&self) -> (ExecutorBackend, Vec<ConfigIssue>) {
        match self.executor.to_lowercase().as_str() {
            "local" => (ExecutorBackend::Local, Vec::new()),
            "toolserver" | "tool_server" => (ExecutorBackend::ToolServer, Vec::new()),
            other => (
                ExecutorBackend::Local,
                vec![invalid_enum(
                    "tools.executor",
                    other,
                    &["local", "toolserver"],
                    "local",
                )],
            ),
        }
    }

    /// Selection and batching parameters; model settings are layered on by the caller.
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_k_tools(self.k_tools.max(1))
            .with_recent_turns(self.recent_turns)
            .with_core_tools(self.core_tools.clone())
            .with_cache_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_batch(self.try_batch_execute, self.parallel_batch)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.parse_discovery().1);
        issues.extend(self.parse_executor().1);

        if self.k_tools == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "tools.k_tools".to_string(),
                },
                "tools.k_tools is 0, using 1",
            ));
        }
        if self.sandbox_root.is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::SandboxDisabled,
                "tools.sandbox_root is not set, file and directory tools are disabled",
            ));
        }
        issues
    }
}

fn invalid_enum(field: &str, value: &str, valid: &[&str], fallback: &str) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            valid_values: valid.iter().map(|v| v.to_string()).collect(),
        },
        format!(
            "{}: unknown value '{}', falling back to '{}'",
            field, value, fallback
        ),
    )
}
