//! Tool domain entities

use super::name::sanitize_tool_name;
use super::value_objects::ToolError;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Key under which unparseable model arguments are preserved.
pub const RAW_ARGUMENTS_KEY: &str = "_raw_arguments";

/// Schema and description of a tool, independent of its implementation.
///
/// Identity is the dotted `name`. Descriptors are loaded from sidecar files
/// in the OpenAI function format and are immutable once the registry is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique dotted name (e.g., "file.read")
    pub name: String,
    /// Human-readable description, also used as retrieval text
    pub description: String,
    /// JSON-schema object describing the arguments
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: empty_object_schema(),
        }
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Add a property to the parameter schema (builder pattern)
    pub fn with_property(
        mut self,
        name: &str,
        json_type: &str,
        description: &str,
        required: bool,
    ) -> Self {
        if !self.parameters.is_object() {
            self.parameters = empty_object_schema();
        }
        if let Value::Object(schema) = &mut self.parameters {
            let properties = schema
                .entry("properties")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(props) = properties {
                props.insert(
                    name.to_string(),
                    serde_json::json!({ "type": json_type, "description": description }),
                );
            }
            if required {
                let list = schema
                    .entry("required")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = list {
                    items.push(Value::String(name.to_string()));
                }
            }
        }
        self
    }

    /// The name under which this tool is offered to the model.
    pub fn api_name(&self) -> String {
        sanitize_tool_name(&self.name)
    }

    /// Text embedded for retrieval-based discovery.
    pub fn retrieval_text(&self) -> String {
        format!("Tool name: {}. Description: {}", self.name, self.description)
    }

    /// Declared properties, if the schema has any.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.parameters.get("properties").and_then(|p| p.as_object())
    }

    /// Names listed under `required`.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    /// Whether the schema allows properties it does not declare.
    pub fn allows_additional_properties(&self) -> bool {
        matches!(
            self.parameters.get("additionalProperties"),
            Some(Value::Bool(true)) | Some(Value::Object(_))
        )
    }

    /// Parse one descriptor.
    ///
    /// Accepts the OpenAI wrapper `{"type": "function", "function": {...}}`
    /// as well as the bare `{"name", "description", "parameters"}` shape.
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        let body = match value.get("function") {
            Some(function) if function.is_object() => function,
            _ => value,
        };

        let name = body
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DomainError::InvalidDescriptor("missing 'name'".to_string()))?;

        let description = body
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default();

        let parameters = match body.get("parameters") {
            None | Some(Value::Null) => empty_object_schema(),
            Some(p @ Value::Object(_)) => p.clone(),
            Some(_) => {
                return Err(DomainError::InvalidDescriptor(format!(
                    "'parameters' of '{}' must be an object",
                    name
                )));
            }
        };

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        })
    }

    /// Parse a sidecar document holding either one descriptor or a list.
    pub fn parse_document(text: &str) -> Result<Vec<Self>, DomainError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| DomainError::MalformedDescriptorDocument(e.to_string()))?;

        match &value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            Value::Object(_) => Ok(vec![Self::from_value(&value)?]),
            _ => Err(DomainError::MalformedDescriptorDocument(
                "expected an object or a list of objects".to_string(),
            )),
        }
    }
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// Ordered, read-only collection of tool descriptors.
///
/// Lookup works with the canonical dotted name or the sanitized API name
/// the model sees. Order is registration order and drives tie-breaking in
/// ranked discovery.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
    /// API name → canonical name
    api_names: HashMap<String, String>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. The first registration of a name wins.
    pub fn insert(&mut self, descriptor: ToolDescriptor) -> Result<(), DomainError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(DomainError::DuplicateTool(descriptor.name));
        }
        self.api_names
            .entry(descriptor.api_name())
            .or_insert_with(|| descriptor.name.clone());
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Builder variant of [`insert`](Self::insert) that ignores duplicates.
    pub fn register(mut self, descriptor: ToolDescriptor) -> Self {
        let _ = self.insert(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Resolve a canonical or API name to the canonical name.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.index.contains_key(name) {
            Some(name)
        } else {
            self.api_names.get(name).map(|s| s.as_str())
        }
    }

    /// Get a descriptor by canonical or API name.
    pub fn get_resolved(&self, name: &str) -> Option<&ToolDescriptor> {
        self.resolve(name).and_then(|canonical| self.get(canonical))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.descriptors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// `(name, retrieval text)` pairs in catalog order.
    pub fn retrieval_texts(&self) -> Vec<(String, String)> {
        self.descriptors
            .iter()
            .map(|d| (d.name.clone(), d.retrieval_text()))
            .collect()
    }

    /// Descriptors for the given names, in the order requested.
    ///
    /// Unknown names are skipped; repeated names appear once.
    pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<ToolDescriptor> {
        let mut seen = std::collections::HashSet::new();
        names
            .into_iter()
            .filter_map(|n| self.get_resolved(n))
            .filter(|d| seen.insert(d.name.clone()))
            .cloned()
            .collect()
    }
}

/// Arguments passed to a tool: a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Add an argument (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Get an optional string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument
    pub fn require_string(&self, key: &str) -> Result<&str, ToolError> {
        self.get_string(key)
            .ok_or_else(|| ToolError::invalid_argument(format!("Missing required argument: {}", key)))
    }

    /// Get an optional i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|v| v.as_i64())
    }

    /// Get an optional bool argument
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    /// Get an optional list of strings; non-string items are skipped
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.0.get(key).and_then(|v| v.as_array()).map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
    }

    /// The raw text kept when the model's arguments were not a JSON object.
    pub fn raw_fallback(&self) -> Option<&str> {
        self.get_string(RAW_ARGUMENTS_KEY)
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A model's request to invoke one tool.
///
/// `arguments` is the raw string the model produced. It is parsed lazily so
/// that a malformed payload becomes a per-call failure instead of aborting
/// the whole turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Model-assigned identifier, echoed back on the tool turn
    pub id: String,
    /// Name as emitted by the model (usually the sanitized API name)
    pub function_name: String,
    /// Raw JSON argument string
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        function_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function_name: function_name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw argument string.
    ///
    /// Empty input yields no arguments. Input that is not a JSON object is
    /// preserved under [`RAW_ARGUMENTS_KEY`].
    pub fn parse_arguments(&self) -> ToolArguments {
        let raw = self.arguments.trim();
        if raw.is_empty() {
            return ToolArguments::new();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => ToolArguments(map),
            _ => ToolArguments::new().with(RAW_ARGUMENTS_KEY, self.arguments.clone()),
        }
    }
}

/// One call in a batch: resolved function name plus parsed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub function: String,
    #[serde(default)]
    pub arguments: ToolArguments,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ToolInvocation {
    pub fn new(function: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            function: function.into(),
            arguments,
            tool_call_id: None,
        }
    }

    pub fn with_tool_call_id(mut self, id: impl Into<String>) -> Self {
        self.tool_call_id = Some(id.into());
        self
    }

    /// Build an invocation from a model request, mapping its name through `canonical`.
    pub fn from_request(request: &ToolCallRequest, canonical: &str) -> Self {
        Self {
            function: canonical.to_string(),
            arguments: request.parse_arguments(),
            tool_call_id: Some(request.id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_openai_wrapper() {
        let value = serde_json::json!({
            "type": "function",
            "function": {
                "name": "file.read",
                "description": "Read a file",
                "parameters": {
                    "type": "object",
                    "properties": { "path": { "type": "string" } },
                    "required": ["path"]
                }
            }
        });

        let descriptor = ToolDescriptor::from_value(&value).unwrap();
        assert_eq!(descriptor.name, "file.read");
        assert_eq!(descriptor.description, "Read a file");
        assert_eq!(descriptor.required_parameters(), vec!["path"]);
        assert_eq!(descriptor.api_name(), "file_read");
    }

    #[test]
    fn test_descriptor_from_bare_object_defaults_parameters() {
        let value = serde_json::json!({ "name": "time.current_datetime" });
        let descriptor = ToolDescriptor::from_value(&value).unwrap();
        assert_eq!(descriptor.description, "");
        assert!(descriptor.properties().unwrap().is_empty());
    }

    #[test]
    fn test_descriptor_missing_name_rejected() {
        let value = serde_json::json!({ "description": "nameless" });
        assert!(matches!(
            ToolDescriptor::from_value(&value),
            Err(DomainError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_parse_document_single_and_list() {
        let single = r#"{"type":"function","function":{"name":"a.b","description":"x"}}"#;
        assert_eq!(ToolDescriptor::parse_document(single).unwrap().len(), 1);

        let list = r#"[{"name":"a.b"},{"name":"a.c"}]"#;
        let parsed = ToolDescriptor::parse_document(list).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].name, "a.c");
    }

    #[test]
    fn test_parse_document_malformed() {
        assert!(matches!(
            ToolDescriptor::parse_document("{not json"),
            Err(DomainError::MalformedDescriptorDocument(_))
        ));
        assert!(ToolDescriptor::parse_document("42").is_err());
    }

    #[test]
    fn test_retrieval_text() {
        let descriptor = ToolDescriptor::new("state.get", "Read a value");
        assert_eq!(
            descriptor.retrieval_text(),
            "Tool name: state.get. Description: Read a value"
        );
    }

    #[test]
    fn test_with_property_builds_schema() {
        let descriptor = ToolDescriptor::new("file.save", "Save")
            .with_property("path", "string", "Relative path", true)
            .with_property("content", "string", "Text", false);

        assert_eq!(descriptor.properties().unwrap().len(), 2);
        assert_eq!(descriptor.required_parameters(), vec!["path"]);
        assert!(!descriptor.allows_additional_properties());
    }

    #[test]
    fn test_catalog_first_registration_wins() {
        let mut catalog = ToolCatalog::new();
        catalog.insert(ToolDescriptor::new("file.read", "first")).unwrap();
        let err = catalog
            .insert(ToolDescriptor::new("file.read", "second"))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(catalog.get("file.read").unwrap().description, "first");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_catalog_resolves_api_names() {
        let catalog = ToolCatalog::new()
            .register(ToolDescriptor::new("file.read", "Read"))
            .register(ToolDescriptor::new("state.set", "Set"));

        assert_eq!(catalog.resolve("file_read"), Some("file.read"));
        assert_eq!(catalog.resolve("file.read"), Some("file.read"));
        assert_eq!(catalog.resolve("nope"), None);
        assert_eq!(catalog.get_resolved("state_set").unwrap().name, "state.set");
    }

    #[test]
    fn test_catalog_select_preserves_request_order() {
        let catalog = ToolCatalog::new()
            .register(ToolDescriptor::new("a.one", ""))
            .register(ToolDescriptor::new("a.two", ""))
            .register(ToolDescriptor::new("a.three", ""));

        let selected = catalog.select(["a.three", "missing", "a.one", "a.three"]);
        let names: Vec<_> = selected.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.three", "a.one"]);
    }

    #[test]
    fn test_parse_arguments_object() {
        let request = ToolCallRequest::new("call_1", "file_read", r#"{"path": "notes.txt"}"#);
        let args = request.parse_arguments();
        assert_eq!(args.get_string("path"), Some("notes.txt"));
        assert!(args.raw_fallback().is_none());
    }

    #[test]
    fn test_parse_arguments_empty() {
        let request = ToolCallRequest::new("call_1", "time_current_datetime", "  ");
        assert!(request.parse_arguments().is_empty());
    }

    #[test]
    fn test_parse_arguments_invalid_json_falls_back() {
        let request = ToolCallRequest::new("call_1", "file_read", "{path: notes");
        let args = request.parse_arguments();
        assert_eq!(args.raw_fallback(), Some("{path: notes"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_arguments_non_object_falls_back() {
        let request = ToolCallRequest::new("call_1", "file_read", "[1, 2]");
        assert_eq!(request.parse_arguments().raw_fallback(), Some("[1, 2]"));
    }

    #[test]
    fn test_require_string_error_code() {
        let args = ToolArguments::new().with("count", 3);
        let err = args.require_string("path").unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert_eq!(args.get_i64("count"), Some(3));
    }

    #[test]
    fn test_invocation_from_request() {
        let request = ToolCallRequest::new("call_9", "state_get", r#"{"key": "plan"}"#);
        let invocation = ToolInvocation::from_request(&request, "state.get");
        assert_eq!(invocation.function, "state.get");
        assert_eq!(invocation.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(invocation.arguments.get_string("key"), Some("plan"));
    }
}
