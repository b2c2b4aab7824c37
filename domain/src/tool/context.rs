//! Per-turn execution context handed to every tool body.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Key/value scratch space shared by the tools of one turn.
///
/// Created fresh for every user turn and dropped with it, so state tools
/// never leak values between tasks.
#[derive(Debug, Default)]
pub struct TaskScratchpad {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl TaskScratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Append to the list stored at `key`, creating it when absent.
    ///
    /// Returns the existing value unchanged as `Err` when it is not a list.
    pub fn append(&self, key: &str, item: Value) -> Result<usize, Value> {
        let Ok(mut entries) = self.entries.lock() else {
            return Err(Value::Null);
        };
        let slot = entries
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => {
                items.push(item);
                Ok(items.len())
            }
            other => Err(other.clone()),
        }
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.is_empty())
            .unwrap_or(true)
    }
}

/// Context for one invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    scratchpad: Arc<TaskScratchpad>,
    conversation_id: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scratchpad(mut self, scratchpad: Arc<TaskScratchpad>) -> Self {
        self.scratchpad = scratchpad;
        self
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn scratchpad(&self) -> &TaskScratchpad {
        &self.scratchpad
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }
}
