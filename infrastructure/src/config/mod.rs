//! Configuration loading for toolrelay
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `TOOLRELAY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolrelay.toml` or `./.toolrelay.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolrelay/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigIssueCode, DiscoveryBackend, ExecutorBackend, FileConfig,
    FileEmbeddingConfig, FileLoggingConfig, FileModelConfig, FileToolServerConfig,
    FileToolsConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource, ConfigSourceKind, ENV_PREFIX};
