use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use toolrelay_application::{
    BatchError, Discovery, DiscoveryError, DiscoveryRequest, ToolDiscoveryPort, ToolExecutorPort,
};
use toolrelay_domain::{
    AliasMap, ToolContext, ToolDescriptor, ToolExecutionResult, ToolInvocation, sanitize_tool_name,
};
use tracing::{debug, warn};

/// Default tool server address
pub const DEFAULT_BASE_URL: &str = "http://localhost:7077";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Conversation id sent when the context carries none
const ANONYMOUS_CONVERSATION: &str = "default";

/// Errors talking to the tool server.
#[derive(Error, Debug)]
pub enum ToolServerError {
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} {status}: {detail}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        detail: String,
    },

    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },
}

/// HTTP client for a tool server.
#[derive(Debug, Clone)]
pub struct ToolServerClient {
    http: Client,
    base_url: String,
}

impl ToolServerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: &Value) -> Result<T, ToolServerError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(payload)
            .send()
            .await
            .map_err(|source| ToolServerError::Transport {
                method: "POST",
                path: path.to_string(),
                source,
            })?;
        Self::decode("POST", path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ToolServerError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|source| ToolServerError::Transport {
                method: "GET",
                path: path.to_string(),
                source,
            })?;
        Self::decode("GET", path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ToolServerError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ToolServerError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        // An empty body reads as an empty object
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ToolServerError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Value, ToolServerError> {
        self.get("/health").await
    }

    /// `GET /config`: the server's active configuration
    pub async fn server_config(&self) -> Result<Value, ToolServerError> {
        self.get("/config").await
    }

    /// `POST /tools/reload`: ask the server to rescan its tool modules
    pub async fn reload_tools(&self) -> Result<Value, ToolServerError> {
        self.post("/tools/reload", &json!({})).await
    }

    /// `POST /discover` without local caching.
    pub async fn discover_raw(&self, request: &DiscoveryRequest) -> Result<Discovery, ToolServerError> {
        let payload = json!({
            "conversation_id": request.conversation_id,
            "messages": request.conversation,
            "k_tools": request.k,
        });
        let response: DiscoverResponse = self.post("/discover", &payload).await?;
        Ok(response.into_discovery())
    }

    /// `POST /execute`
    pub async fn execute_raw(
        &self,
        conversation_id: &str,
        call: &ToolInvocation,
    ) -> Result<ToolExecutionResult, ToolServerError> {
        let mut payload = call_payload(call);
        payload["conversation_id"] = json!(conversation_id);
        self.post("/execute", &payload).await
    }

    /// `POST /execute/batch`
    pub async fn execute_batch_raw(
        &self,
        conversation_id: &str,
        calls: &[ToolInvocation],
        parallel: bool,
    ) -> Result<Vec<ToolExecutionResult>, ToolServerError> {
        let payload = json!({
            "conversation_id": conversation_id,
            "calls": calls.iter().map(call_payload).collect::<Vec<_>>(),
            "parallel": parallel,
        });
        let response: BatchResponse = self.post("/execute/batch", &payload).await?;
        Ok(response.results)
    }
}

/// The `detail` field of an error body, or the body itself.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
        .unwrap_or_else(|| body.to_string())
}

/// Calls go out under their API-safe names, the names the server advertises.
fn call_payload(call: &ToolInvocation) -> Value {
    let mut payload = json!({
        "function": sanitize_tool_name(&call.function),
        "arguments": call.arguments,
    });
    if let Some(id) = &call.tool_call_id {
        payload["tool_call_id"] = json!(id);
    }
    payload
}

fn conversation_id(ctx: &ToolContext) -> &str {
    ctx.conversation_id().unwrap_or(ANONYMOUS_CONVERSATION)
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    tools: Vec<Value>,
    #[serde(default)]
    alias_map: AliasMap,
    #[serde(default)]
    cache_ttl_sec: Option<u64>,
}

impl DiscoverResponse {
    /// Tool specs that fail to parse are dropped with a warning.
    fn into_discovery(self) -> Discovery {
        let mut alias_map = self.alias_map;
        let tools: Vec<ToolDescriptor> = self
            .tools
            .iter()
            .filter_map(|spec| match ToolDescriptor::from_value(spec) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!(error = %e, "Ignoring malformed tool spec from discovery");
                    None
                }
            })
            .map(|descriptor| {
                // Servers may advertise API-safe names; map them back
                match alias_map.resolve(&descriptor.name) {
                    Some(canonical) if canonical != descriptor.name => ToolDescriptor {
                        name: canonical.to_string(),
                        ..descriptor
                    },
                    _ => descriptor,
                }
            })
            .collect();

        for tool in &tools {
            alias_map.register(&tool.name);
        }

        Discovery {
            tools,
            alias_map,
            cache_ttl: self.cache_ttl_sec.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<ToolExecutionResult>,
}

#[async_trait]
impl ToolDiscoveryPort for ToolServerClient {
    async fn discover(&self, request: &DiscoveryRequest) -> Result<Discovery, DiscoveryError> {
        debug!(conversation_id = %request.conversation_id, k = request.k, "Discovering tools remotely");
        self.discover_raw(request).await.map_err(|e| match e {
            ToolServerError::Decode { .. } => DiscoveryError::InvalidResponse(e.to_string()),
            _ => DiscoveryError::Transport(e.to_string()),
        })
    }
}

#[async_trait]
impl ToolExecutorPort for ToolServerClient {
    async fn execute(&self, call: &ToolInvocation, ctx: &ToolContext) -> ToolExecutionResult {
        match self.execute_raw(conversation_id(ctx), call).await {
            Ok(result) => {
                // Report under the canonical name and the caller's id
                let mut result = result.with_tool_call_id(call.tool_call_id.clone());
                result.function_name = call.function.clone();
                result
            }
            Err(e) => {
                warn!(tool = %call.function, error = %e, "Remote tool execution failed");
                ToolExecutionResult::failure(&call.function, e.to_string())
                    .with_tool_call_id(call.tool_call_id.clone())
            }
        }
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn execute_batch(
        &self,
        calls: &[ToolInvocation],
        parallel: bool,
        ctx: &ToolContext,
    ) -> Result<Vec<ToolExecutionResult>, BatchError> {
        let results = self
            .execute_batch_raw(conversation_id(ctx), calls, parallel)
            .await
            .map_err(|e| BatchError::Transport(e.to_string()))?;

        if results.len() != calls.len() {
            return Err(BatchError::ResultCountMismatch {
                expected: calls.len(),
                actual: results.len(),
            });
        }

        let results = match_results(calls, results)?;
        Ok(results
            .into_iter()
            .zip(calls)
            .map(|(mut result, call)| {
                result.function_name = call.function.clone();
                result.tool_call_id = call.tool_call_id.clone().or(result.tool_call_id);
                result
            })
            .collect())
    }
}

/// Put batch results into call order.
///
/// The server may finish calls in any order, so when every call and every
/// result carries an id, results are matched by id. An unknown or repeated
/// id is an error. Without ids the results are taken positionally.
fn match_results(
    calls: &[ToolInvocation],
    results: Vec<ToolExecutionResult>,
) -> Result<Vec<ToolExecutionResult>, BatchError> {
    let by_id = calls.iter().all(|c| c.tool_call_id.is_some())
        && results.iter().all(|r| r.tool_call_id.is_some());
    if !by_id {
        return Ok(results);
    }

    let mut slots: Vec<Option<ToolExecutionResult>> = calls.iter().map(|_| None).collect();
    for result in results {
        let id = result.tool_call_id.clone().unwrap_or_default();
        let slot = calls
            .iter()
            .position(|c| c.tool_call_id.as_deref() == Some(id.as_str()))
            .and_then(|index| slots.get_mut(index))
            .filter(|slot| slot.is_none())
            .ok_or_else(|| BatchError::UnmatchedResult(id.clone()))?;
        *slot = Some(result);
    }
    // Counts are equal and no slot is filled twice, so every slot is filled
    slots
        .into_iter()
        .zip(calls)
        .map(|(slot, call)| {
            slot.ok_or_else(|| {
                BatchError::UnmatchedResult(call.tool_call_id.clone().unwrap_or_default())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use toolrelay_domain::{ConversationTurn, DiscoveryQuery, ToolArguments};

    // ==================== Test Server ====================

    /// Serve canned responses in order, recording each raw request.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{}", addr), requests)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        l.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn body_of(request: &str) -> Value {
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn discovery_request() -> DiscoveryRequest {
        let conversation = vec![ConversationTurn::user("what time is it?")];
        DiscoveryRequest {
            conversation_id: "c1".to_string(),
            query: DiscoveryQuery::from_conversation(&conversation, 2).unwrap(),
            conversation,
            k: 5,
        }
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_discover_maps_response() {
        let (url, requests) = serve(vec![(
            200,
            r#"{"method": "tools",
                "tools": [{"type": "function", "function": {"name": "time_current_datetime", "description": "Now", "parameters": {"type": "object", "properties": {}}}}],
                "alias_map": {"time_current_datetime": "time.current_datetime"},
                "cache_ttl_sec": 120}"#,
        )])
        .await;
        let client = ToolServerClient::new(url).unwrap();

        let discovery = client.discover(&discovery_request()).await.unwrap();
        assert_eq!(discovery.tools.len(), 1);
        assert_eq!(discovery.tools[0].name, "time.current_datetime");
        assert_eq!(
            discovery.alias_map.resolve("time_current_datetime"),
            Some("time.current_datetime")
        );
        assert_eq!(discovery.cache_ttl, Some(Duration::from_secs(120)));

        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("POST /discover"));
        let body = body_of(&request);
        assert_eq!(body["conversation_id"], "c1");
        assert_eq!(body["k_tools"], 5);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_discover_error_is_transport() {
        let (url, _) = serve(vec![(500, r#"{"detail": "index not built"}"#)]).await;
        let client = ToolServerClient::new(url).unwrap();

        let err = client.discover(&discovery_request()).await.unwrap_err();
        match err {
            DiscoveryError::Transport(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("index not built"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_sends_api_name() {
        let (url, requests) = serve(vec![(
            200,
            r#"{"ok": true, "content": "2026-01-01T00:00:00+00:00", "duration_ms": 3}"#,
        )])
        .await;
        let client = ToolServerClient::new(url).unwrap();
        let call = ToolInvocation::new("time.current_datetime", ToolArguments::new())
            .with_tool_call_id("call_7");

        let result = client
            .execute(&call, &ToolContext::new().with_conversation_id("c9"))
            .await;
        assert!(result.ok());
        assert_eq!(result.function_name, "time.current_datetime");
        assert_eq!(result.tool_call_id.as_deref(), Some("call_7"));
        assert_eq!(result.duration_ms, 3);

        let body = body_of(&requests.lock().unwrap()[0]);
        assert_eq!(body["function"], "time_current_datetime");
        assert_eq!(body["conversation_id"], "c9");
        assert_eq!(body["tool_call_id"], "call_7");
    }

    #[tokio::test]
    async fn test_execute_http_error_becomes_failure() {
        let (url, _) = serve(vec![(422, r#"{"detail": "bad arguments"}"#)]).await;
        let client = ToolServerClient::new(url).unwrap();

        let result = client
            .execute(&ToolInvocation::new("file.read", ToolArguments::new()), &ToolContext::new())
            .await;
        assert!(!result.ok());
        assert!(result.error().unwrap().contains("bad arguments"));
    }

    #[tokio::test]
    async fn test_batch_result_count_mismatch() {
        let (url, _) = serve(vec![(200, r#"{"results": [{"ok": true, "content": "x"}]}"#)]).await;
        let client = ToolServerClient::new(url).unwrap();
        let calls = vec![
            ToolInvocation::new("a.one", ToolArguments::new()),
            ToolInvocation::new("a.two", ToolArguments::new()),
        ];

        let err = client
            .execute_batch(&calls, false, &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BatchError::ResultCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_batch_keeps_call_ids() {
        let (url, requests) = serve(vec![(
            200,
            r#"{"results": [{"ok": true, "content": "1"}, {"ok": false, "error": "boom"}]}"#,
        )])
        .await;
        let client = ToolServerClient::new(url).unwrap();
        let calls = vec![
            ToolInvocation::new("a.one", ToolArguments::new()).with_tool_call_id("x"),
            ToolInvocation::new("a.two", ToolArguments::new()).with_tool_call_id("y"),
        ];

        let results = client
            .execute_batch(&calls, true, &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(results[0].tool_call_id.as_deref(), Some("x"));
        assert_eq!(results[1].function_name, "a.two");
        assert_eq!(results[1].error(), Some("boom"));

        let body = body_of(&requests.lock().unwrap()[0]);
        assert_eq!(body["parallel"], true);
        assert_eq!(body["calls"][0]["function"], "a_one");
    }

    #[tokio::test]
    async fn test_batch_results_follow_call_ids() {
        let (url, _requests) = serve(vec![(
            200,
            r#"{"results": [
                {"tool_call_id": "2", "function": "b_tool", "ok": true, "content": "B"},
                {"tool_call_id": "1", "function": "a_tool", "ok": true, "content": "A"}
            ]}"#,
        )])
        .await;
        let client = ToolServerClient::new(url).unwrap();
        let calls = vec![
            ToolInvocation::new("a.tool", ToolArguments::new()).with_tool_call_id("1"),
            ToolInvocation::new("b.tool", ToolArguments::new()).with_tool_call_id("2"),
        ];

        let results = client
            .execute_batch(&calls, true, &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(results[0].tool_call_id.as_deref(), Some("1"));
        assert_eq!(results[0].function_name, "a.tool");
        assert_eq!(results[0].content(), Some("A"));
        assert_eq!(results[1].tool_call_id.as_deref(), Some("2"));
        assert_eq!(results[1].content(), Some("B"));
    }

    #[tokio::test]
    async fn test_batch_unknown_result_id_is_an_error() {
        let (url, _requests) = serve(vec![(
            200,
            r#"{"results": [
                {"tool_call_id": "1", "ok": true, "content": "A"},
                {"tool_call_id": "9", "ok": true, "content": "?"}
            ]}"#,
        )])
        .await;
        let client = ToolServerClient::new(url).unwrap();
        let calls = vec![
            ToolInvocation::new("a.tool", ToolArguments::new()).with_tool_call_id("1"),
            ToolInvocation::new("b.tool", ToolArguments::new()).with_tool_call_id("2"),
        ];

        let err = client
            .execute_batch(&calls, false, &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::UnmatchedResult(id) if id == "9"));
    }

    #[test]
    fn test_duplicate_result_id_is_an_error() {
        let calls = vec![
            ToolInvocation::new("a.tool", ToolArguments::new()).with_tool_call_id("1"),
            ToolInvocation::new("b.tool", ToolArguments::new()).with_tool_call_id("2"),
        ];
        let results = vec![
            ToolExecutionResult::success("a.tool", "A").with_tool_call_id(Some("1".into())),
            ToolExecutionResult::success("a.tool", "A").with_tool_call_id(Some("1".into())),
        ];
        assert!(matches!(
            match_results(&calls, results),
            Err(BatchError::UnmatchedResult(id)) if id == "1"
        ));
    }

    #[tokio::test]
    async fn test_utilities_hit_their_endpoints() {
        let (url, requests) = serve(vec![
            (200, r#"{"status": "ok"}"#),
            (200, r#"{"port": 7077}"#),
            (200, ""),
        ])
        .await;
        let client = ToolServerClient::new(url).unwrap();

        assert_eq!(client.health().await.unwrap()["status"], "ok");
        assert_eq!(client.server_config().await.unwrap()["port"], 7077);
        assert_eq!(client.reload_tools().await.unwrap(), json!({}));

        let requests = requests.lock().unwrap();
        assert!(requests[0].starts_with("GET /health"));
        assert!(requests[1].starts_with("GET /config"));
        assert!(requests[2].starts_with("POST /tools/reload"));
    }

    #[test]
    fn test_error_detail_falls_back_to_body() {
        assert_eq!(error_detail(r#"{"detail": "nope"}"#), "nope");
        assert_eq!(error_detail("plain text"), "plain text");
    }
}
