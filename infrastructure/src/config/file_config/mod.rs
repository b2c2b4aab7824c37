//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; string enums are parsed on demand so a
//! bad value degrades to a default with a reported issue.

mod issues;
mod model;
mod services;
mod tools;

pub use issues::{ConfigIssue, ConfigIssueCode, Severity};
pub use model::FileModelConfig;
pub use services::{FileEmbeddingConfig, FileLoggingConfig, FileToolServerConfig};
pub use tools::{DiscoveryBackend, ExecutorBackend, FileToolsConfig};

use serde::{Deserialize, Serialize};
use toolrelay_application::ExecutionParams;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model gateway settings
    pub model: FileModelConfig,
    /// Sandbox, selection and execution settings
    pub tools: FileToolsConfig,
    /// Embedding service for discovery
    pub embedding: FileEmbeddingConfig,
    /// Remote tool server
    pub toolserver: FileToolServerConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.model.validate());
        issues.extend(self.tools.validate());

        let needs_toolserver = self.tools.parse_discovery().0 == DiscoveryBackend::ToolServer
            || self.tools.parse_executor().0 == ExecutorBackend::ToolServer;
        if needs_toolserver && self.toolserver_url().is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingSetting {
                    field: "toolserver.base_url".to_string(),
                },
                "the tool server is selected but toolserver.base_url is not set",
            ));
        }

        if self.tools.parse_discovery().0 == DiscoveryBackend::Embedding
            && self.embedding.enabled
            && self.embedding.model.trim().is_empty()
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "embedding.model".to_string(),
                },
                "embedding.model is empty",
            ));
        }

        issues
    }

    /// Full turn parameters: `[tools]` plus the model's prompt and tool choice.
    pub fn execution_params(&self) -> ExecutionParams {
        let mut params = self
            .tools
            .to_execution_params()
            .with_tool_choice(self.model.parse_tool_choice().0);
        if let Some(prompt) = self.model.system_prompt.as_ref().filter(|p| !p.is_empty()) {
            params = params.with_system_prompt(prompt.clone());
        }
        params
    }

    pub fn toolserver_url(&self) -> Option<&str> {
        self.toolserver
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
    }

    pub fn embedding_base_url(&self) -> &str {
        self.embedding
            .base_url
            .as_deref()
            .unwrap_or(&self.model.base_url)
    }

    pub fn embedding_api_key(&self) -> Option<String> {
        self.embedding
            .api_key
            .clone()
            .or_else(|| self.model.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrelay_application::ToolChoice;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[model]
base_url = "https://api.openai.com/v1"
api_key = "sk-test"
model = "gpt-4o-mini"
tool_choice = "required"
system_prompt = "You are terse."

[tools]
sandbox_root = "/tmp/ws"
k_tools = 4
core_tools = ["time.current_datetime"]
discovery = "toolserver"
parallel_batch = true

[toolserver]
base_url = "http://localhost:7077"

[logging]
conversation_log = "logs/turns.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.tools.k_tools, 4);
        assert_eq!(config.toolserver_url(), Some("http://localhost:7077"));
        assert!(config.validate().is_empty());

        let params = config.execution_params();
        assert_eq!(params.tool_choice, ToolChoice::Required);
        assert_eq!(params.system_prompt.as_deref(), Some("You are terse."));
        assert_eq!(params.core_tools, vec!["time.current_datetime"]);
        assert!(params.parallel_batch);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[model]\nmodel = \"qwen2.5\"\n").unwrap();
        assert_eq!(config.model.model, "qwen2.5");
        assert_eq!(config.model.timeout_secs, 120);
        assert_eq!(config.tools, FileToolsConfig::default());
    }

    #[test]
    fn test_toolserver_without_url_is_an_error() {
        let mut config = FileConfig::default();
        config.tools.sandbox_root = Some("/tmp".into());
        config.tools.executor = "toolserver".to_string();

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::MissingSetting { .. }
        ));
    }

    #[test]
    fn test_default_config_only_warns_about_sandbox() {
        let issues = FileConfig::default().validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::SandboxDisabled);
    }

    #[test]
    fn test_embedding_inherits_model_endpoint() {
        let mut config = FileConfig::default();
        config.model.api_key = Some("key".to_string());
        assert_eq!(config.embedding_base_url(), config.model.base_url);
        assert_eq!(config.embedding_api_key().as_deref(), Some("key"));

        config.embedding.base_url = Some("http://embed:8080/v1".to_string());
        assert_eq!(config.embedding_base_url(), "http://embed:8080/v1");
    }
}
