//! LLM Gateway port
//!
//! Defines the interface for chat-completion calls with native tool use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use toolrelay_domain::{ConversationTurn, ToolCallRequest};

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether a retry may succeed (transport trouble, throttling, 5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::ConnectionError(_)
            | GatewayError::Timeout
            | GatewayError::RateLimited { .. } => true,
            GatewayError::RequestFailed { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Server-requested wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// The model decides
    #[default]
    Auto,
    /// Tools are listed but must not be called
    None,
    /// The model must call at least one tool
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
            ToolChoice::Required => "required",
        }
    }
}

impl std::str::FromStr for ToolChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ToolChoice::Auto),
            "none" => Ok(ToolChoice::None),
            "required" => Ok(ToolChoice::Required),
            other => Err(format!("unknown tool_choice '{}'", other)),
        }
    }
}

/// One chat-completion call.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ConversationTurn>,
    /// Tool schemas in provider format; empty means no tools
    pub tools: Vec<serde_json::Value>,
    /// Ignored when `tools` is empty
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ConversationTurn>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<serde_json::Value>, choice: ToolChoice) -> Self {
        self.tool_choice = if tools.is_empty() { None } else { Some(choice) };
        self.tools = tools;
        self
    }
}

/// A model reply: text, tool-call requests, or both.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
    /// Provider payload as received, kept for the turn trace
    pub raw: serde_json::Value,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCallRequest>) -> Self {
        self.tool_calls = calls;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text content, empty when the model sent none.
    pub fn text_content(&self) -> String {
        self.content.clone().unwrap_or_default()
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer and are
/// expected to retry transient failures themselves; an error returned here
/// is final for the turn.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Run one chat completion
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GatewayError::Timeout.is_retryable());
        assert!(GatewayError::ConnectionError("reset".into()).is_retryable());
        assert!(GatewayError::RateLimited { retry_after: None }.is_retryable());
        assert!(
            GatewayError::RequestFailed {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !GatewayError::RequestFailed {
                status: 400,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(!GatewayError::InvalidResponse("bad".into()).is_retryable());
    }

    #[test]
    fn test_tool_choice_parse() {
        assert_eq!("AUTO".parse::<ToolChoice>(), Ok(ToolChoice::Auto));
        assert_eq!("required".parse::<ToolChoice>(), Ok(ToolChoice::Required));
        assert!("sometimes".parse::<ToolChoice>().is_err());
    }

    #[test]
    fn test_request_without_tools_drops_choice() {
        let request = CompletionRequest::new(vec![]).with_tools(vec![], ToolChoice::Required);
        assert!(request.tool_choice.is_none());

        let request = CompletionRequest::new(vec![])
            .with_tools(vec![serde_json::json!({})], ToolChoice::Auto);
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));
    }
}
