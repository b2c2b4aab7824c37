//! Embedding adapters for retrieval-based tool discovery.

mod http;

pub use http::HttpEmbeddingClient;
