//! Text embedding port.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while embedding text
#[derive(Error, Debug, Clone)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Port for turning texts into vectors
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    /// Embed every text; the result has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
