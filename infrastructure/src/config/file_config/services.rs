//! `[embedding]`, `[toolserver]` and `[logging]` sections

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Raw `[embedding]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmbeddingConfig {
    /// Without embeddings, discovery falls back to the core tools
    pub enabled: bool,
    /// Defaults to `[model] base_url` when unset
    pub base_url: Option<String>,
    /// Defaults to `[model] api_key` when unset
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for FileEmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            api_key: None,
            model: "nomic-embed-text".to_string(),
        }
    }
}

/// Raw `[toolserver]` configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FileToolServerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl FileToolServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Raw `[logging]` configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of turn events
    pub conversation_log: Option<PathBuf>,
    /// Directory for daily rolling diagnostic logs
    pub file_dir: Option<PathBuf>,
}
