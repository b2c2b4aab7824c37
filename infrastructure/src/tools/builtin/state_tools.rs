//! Scratchpad tools: state.set, state.get, state.append_to_list, state.list_keys
//!
//! The scratchpad lives in the [`ToolContext`] and is dropped when the turn
//! ends, so these tools only carry data between calls of the same turn.

use serde_json::Value;
use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput};

use super::provider::FnTool;

pub const MODULE_ID: &str = "state_tools";
pub const SET: &str = "state.set";
pub const GET: &str = "state.get";
pub const APPEND_TO_LIST: &str = "state.append_to_list";
pub const LIST_KEYS: &str = "state.list_keys";

/// Per-turn working memory.
#[derive(Debug, Clone, Default)]
pub struct StateTools;

impl ToolModule for StateTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        Some(vec![
            FnTool::arc(SET, (), set_state),
            FnTool::arc(GET, (), get_state),
            FnTool::arc(APPEND_TO_LIST, (), append_to_list),
            FnTool::arc(LIST_KEYS, (), list_keys),
        ])
    }
}

fn require_key(args: &ToolArguments) -> Result<&str, ToolError> {
    let key = args.require_string("key")?;
    if key.trim().is_empty() {
        return Err(ToolError::invalid_argument(
            "Key must be a non-empty string.",
        ));
    }
    Ok(key)
}

fn set_state(_: &(), args: &ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let key = require_key(args)?;
    let value = args.get("value").cloned().unwrap_or(Value::Null);
    let message = format!("Success: Set blackboard key '{}' to '{}'.", key, value);
    ctx.scratchpad().set(key, value);
    Ok(ToolOutput::Text(message))
}

fn get_state(_: &(), args: &ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let key = args.require_string("key")?;
    match ctx.scratchpad().get(key) {
        Some(value) if !value.is_null() => Ok(ToolOutput::Text(format!(
            "Value for key '{}': {}",
            key, value
        ))),
        _ => Err(ToolError::not_found(format!(
            "No information found on the blackboard for key '{}'.",
            key
        ))),
    }
}

fn append_to_list(
    _: &(),
    args: &ToolArguments,
    ctx: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    let key = require_key(args)?;
    let item = args.get("item").cloned().unwrap_or(Value::Null);
    match ctx.scratchpad().append(key, item) {
        Ok(_) => Ok(ToolOutput::Text(format!(
            "Success: Appended item to list at key '{}'.",
            key
        ))),
        Err(_) => Err(ToolError::invalid_argument(format!(
            "The value at key '{}' is not a list. Cannot append.",
            key
        ))),
    }
}

fn list_keys(_: &(), _args: &ToolArguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let keys = ctx.scratchpad().keys();
    if keys.is_empty() {
        return Ok(ToolOutput::text("The blackboard is currently empty."));
    }
    Ok(ToolOutput::Text(format!(
        "Keys currently on the blackboard: {}",
        keys.join(", ")
    )))
}
