//! Model gateway configuration from TOML (`[model]` section)
//!
//! ```toml
//! [model]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! tool_choice = "auto"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolrelay_application::ToolChoice;

use super::issues::{ConfigIssue, ConfigIssueCode, Severity};

/// Raw `[model]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// OpenAI-compatible API root (Ollama: `http://localhost:11434/v1`)
    pub base_url: String,
    /// Bearer token, if the server wants one
    pub api_key: Option<String>,
    pub model: String,
    /// Prepended unless the conversation already starts with a system turn
    pub system_prompt: Option<String>,
    /// "auto", "none" or "required"
    pub tool_choice: String,
    pub timeout_secs: u64,
    /// Attempts per request, including the first
    pub max_attempts: usize,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "llama3.1".to_string(),
            system_prompt: None,
            tool_choice: "auto".to_string(),
            timeout_secs: 120,
            max_attempts: 3,
        }
    }
}

impl FileModelConfig {
    /// Parse `tool_choice`, falling back to `auto` with an issue.
    pub fn parse_tool_choice(&self) -> (ToolChoice, Vec<ConfigIssue>) {
        match self.tool_choice.parse::<ToolChoice>() {
            Ok(choice) => (choice, Vec::new()),
            Err(_) => (
                ToolChoice::Auto,
                vec![ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "model.tool_choice".to_string(),
                        value: self.tool_choice.clone(),
                        valid_values: vec!["auto".into(), "none".into(), "required".into()],
                    },
                    message: format!(
                        "model.tool_choice: unknown value '{}', falling back to 'auto'",
                        self.tool_choice
                    ),
                }],
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_tool_choice().1;
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "model.model".to_string(),
                },
                "model.model is empty",
            ));
        }
        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "model.base_url".to_string(),
                },
                "model.base_url is empty",
            ));
        }
        issues
    }
}
