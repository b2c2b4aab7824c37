//! OpenAI-compatible chat completions gateway.
//!
//! Talks to `POST {base_url}/chat/completions`, which covers OpenAI itself
//! and compatible servers such as Ollama's `/v1` endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use toolrelay_application::{CompletionRequest, GatewayError, LlmGateway, LlmResponse};
use toolrelay_domain::{ConversationTurn, ToolCallRequest};
use tracing::debug;

use super::retry::{RetryConfig, with_retry};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Model gateway for OpenAI-compatible servers.
pub struct OpenAiGateway {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    retry: RetryConfig,
}

impl OpenAiGateway {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GatewayError> {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        Ok(self)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages.iter().map(message_to_wire).collect::<Vec<_>>(),
        });

        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools.clone());
            if let Some(choice) = &request.tool_choice {
                body["tool_choice"] = json!(choice.as_str());
            }
        }

        body
    }

    async fn send_once(&self, body: &Value) -> Result<Value, GatewayError> {
        let mut builder = self.http.post(self.endpoint()).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(GatewayError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<LlmResponse, GatewayError> {
        let body = self.build_request_body(&request);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion"
        );

        let raw = with_retry(&self.retry, || self.send_once(&body)).await?;
        parse_response(raw)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Serialize a conversation turn into a chat-completions message.
fn message_to_wire(turn: &ConversationTurn) -> Value {
    let mut message = json!({
        "role": turn.role.as_str(),
        "content": turn.content,
    });

    if let Some(calls) = &turn.tool_calls
        && !calls.is_empty()
    {
        message["tool_calls"] = calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": { "name": call.function_name, "arguments": call.arguments },
                })
            })
            .collect();
    }
    if let Some(id) = &turn.tool_call_id {
        message["tool_call_id"] = json!(id);
    }
    if let Some(name) = &turn.name {
        message["name"] = json!(name);
    }

    message
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Parse the first choice of a completion, keeping the raw body.
///
/// Some servers send `arguments` as an object instead of a JSON string; both
/// are accepted. Calls without an id are numbered `call_<index>`.
fn parse_response(raw: Value) -> Result<LlmResponse, GatewayError> {
    let parsed: WireResponse = serde_json::from_value(raw.clone())
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, call)| {
            let arguments = match call.function.arguments {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            ToolCallRequest::new(
                call.id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("call_{}", index)),
                call.function.name,
                arguments,
            )
        })
        .collect();

    Ok(LlmResponse {
        content: choice.message.content,
        tool_calls,
        raw,
    })
}
