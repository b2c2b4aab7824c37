//! Infrastructure layer for toolrelay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the path sandbox and builtin tools, the tool
//! registry and local executor, HTTP clients for the model, embeddings and
//! tool server, the JSONL conversation logger, and configuration loading.

pub mod config;
pub mod embedding;
pub mod logging;
pub mod providers;
pub mod tools;
pub mod toolserver;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, DiscoveryBackend, ExecutorBackend, FileConfig,
    Severity,
};
pub use embedding::HttpEmbeddingClient;
pub use logging::JsonlConversationLogger;
pub use providers::{OpenAiGateway, RetryConfig};
pub use tools::{
    DescriptorSource, JsonSchemaToolConverter, LocalToolExecutor, PathSandbox, RegistryBuilder,
    RegistryStats, ToolRegistry, default_registry,
};
pub use toolserver::{ToolServerClient, ToolServerError};
