//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] that produces the OpenAI
//! function-calling format for chat completion requests.

use serde_json::{Value, json};
use toolrelay_application::ports::tool_schema::ToolSchemaPort;
use toolrelay_domain::ToolDescriptor;

/// Converter to `{"type": "function", "function": {...}}` entries.
///
/// The function name is the descriptor's API-safe alias (`file.read` →
/// `file_read`). Parameter schemas that are not objects are replaced with an
/// empty object schema, since providers reject anything else.
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn tool_to_schema(&self, tool: &ToolDescriptor) -> Value {
        let parameters = if tool.parameters.is_object() {
            tool.parameters.clone()
        } else {
            json!({ "type": "object", "properties": {} })
        };

        json!({
            "type": "function",
            "function": {
                "name": tool.api_name(),
                "description": tool.description,
                "parameters": parameters,
            }
        })
    }
}
