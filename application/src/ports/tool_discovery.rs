//! Tool discovery port.
//!
//! Discovery narrows the catalog to the tools relevant for a turn. It may be
//! answered locally (embedding ranking over the catalog) or by a remote
//! tool server that owns its own catalog.

use crate::ports::embedding::EmbeddingError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use toolrelay_domain::{AliasMap, ConversationTurn, DiscoveryQuery, ToolDescriptor};

/// Errors that can occur during discovery
#[derive(Error, Debug, Clone)]
pub enum DiscoveryError {
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Discovery transport error: {0}")]
    Transport(String),

    #[error("Invalid discovery response: {0}")]
    InvalidResponse(String),
}

/// What discovery is asked.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    pub conversation_id: String,
    pub query: DiscoveryQuery,
    /// Full conversation, for adapters that build their own query
    pub conversation: Vec<ConversationTurn>,
    /// Maximum number of ranked tools
    pub k: usize,
}

/// What discovery answers.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Ranked tools, most relevant first
    pub tools: Vec<ToolDescriptor>,
    /// Extra API-name aliases supplied by the adapter
    pub alias_map: AliasMap,
    /// How long the answer may be cached; `None` uses the configured default
    pub cache_ttl: Option<Duration>,
}

/// Port for tool discovery
#[async_trait]
pub trait ToolDiscoveryPort: Send + Sync {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Discovery, DiscoveryError>;
}
