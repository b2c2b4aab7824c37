//! Tool schema conversion port.
//!
//! Separates "which tools to offer" (selection) from "how to serialize them
//! for the model API" (infrastructure).

use toolrelay_domain::ToolDescriptor;

/// Port for converting tool descriptors to the model API's tool format.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single descriptor, exposing it under its API-safe name.
    fn tool_to_schema(&self, tool: &ToolDescriptor) -> serde_json::Value;

    /// Convert a selection, preserving its order.
    fn tools_schema(&self, tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
        tools.iter().map(|t| self.tool_to_schema(t)).collect()
    }
}
