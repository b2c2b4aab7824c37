//! OpenAI-compatible embeddings client (`POST {base_url}/embeddings`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use toolrelay_application::{EmbeddingError, EmbeddingPort};
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for OpenAI-compatible servers.
pub struct HttpEmbeddingClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, EmbeddingError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| EmbeddingError::RequestFailed(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Order vectors by their `index` and check one came back per input.
fn collect_vectors(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingPort for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(model = %self.model, inputs = texts.len(), "Requesting embeddings");

        let mut builder = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .json(&json!({ "model": self.model, "input": texts }));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::RequestFailed(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;
        collect_vectors(parsed.data, texts.len())
    }
}
