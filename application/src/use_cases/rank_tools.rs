//! Embedding-based tool ranking.
//!
//! [`EmbeddingToolRanker`] answers discovery locally: every catalog entry is
//! embedded once from its retrieval text, the discovery query is embedded
//! per request, and tools are ranked by cosine similarity.
//!
//! The tool index is rebuilt only when the catalog fingerprint (a SHA-256
//! over the sorted retrieval texts) changes.

use crate::ports::embedding::{EmbeddingError, EmbeddingPort};
use crate::ports::tool_discovery::{
    Discovery, DiscoveryError, DiscoveryRequest, ToolDiscoveryPort,
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use toolrelay_domain::{AliasMap, ToolCatalog};
use tracing::{debug, info};

/// Embedded catalog, valid for one fingerprint.
struct ToolIndex {
    fingerprint: String,
    names: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

/// Local discovery over the tool catalog.
pub struct EmbeddingToolRanker {
    embedder: Option<Arc<dyn EmbeddingPort>>,
    catalog: Arc<ToolCatalog>,
    index: Mutex<Option<ToolIndex>>,
}

impl EmbeddingToolRanker {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self {
            embedder: None,
            catalog,
            index: Mutex::new(None),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingPort>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Rank catalog tools against `query`, best first, at most `k`.
    pub async fn rank(&self, query: &str, k: usize) -> Result<Vec<String>, DiscoveryError> {
        let Some(embedder) = &self.embedder else {
            return Err(DiscoveryError::EmbeddingUnavailable(
                "no embedding backend configured".to_string(),
            ));
        };

        let catalog = &self.catalog;
        if catalog.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut guard = self.index.lock().await;
        let fingerprint = catalog_fingerprint(catalog);
        let stale = guard
            .as_ref()
            .is_none_or(|index| index.fingerprint != fingerprint);
        if stale {
            let entries = catalog.retrieval_texts();
            let (names, texts): (Vec<String>, Vec<String>) = entries.into_iter().unzip();
            let vectors = embedder.embed(&texts).await?;
            if vectors.len() != names.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} vectors, got {}",
                    names.len(),
                    vectors.len()
                ))
                .into());
            }
            info!(tools = names.len(), "Built tool embedding index");
            *guard = Some(ToolIndex {
                fingerprint,
                names,
                vectors,
            });
        }
        let Some(index) = guard.as_ref() else {
            return Ok(Vec::new());
        };

        let query_vector = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DiscoveryError::from(EmbeddingError::InvalidResponse(
                    "no vector for query".to_string(),
                ))
            })?;

        let mut scored: Vec<(usize, f32)> = index
            .vectors
            .iter()
            .map(|v| cosine_similarity(&query_vector, v))
            .enumerate()
            .collect();
        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let ranked: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(i, _)| index.names[i].clone())
            .collect();
        debug!(ranked = ?ranked, "Ranked tools");
        Ok(ranked)
    }
}

#[async_trait]
impl ToolDiscoveryPort for EmbeddingToolRanker {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Discovery, DiscoveryError> {
        let ranked = self.rank(&request.query.render(), request.k).await?;
        let tools = self.catalog.select(ranked.iter().map(|s| s.as_str()));
        let alias_map = AliasMap::from_names(tools.iter().map(|t| t.name.as_str()));
        Ok(Discovery {
            tools,
            alias_map,
            cache_ttl: None,
        })
    }
}

/// SHA-256 hex over the sorted retrieval texts.
pub fn catalog_fingerprint(catalog: &ToolCatalog) -> String {
    let mut texts: Vec<String> = catalog
        .retrieval_texts()
        .into_iter()
        .map(|(_, text)| text)
        .collect();
    texts.sort();
    let digest = Sha256::digest(texts.join("\n").as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Cosine similarity; zero when either vector has no magnitude or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
