//! Cached discovery result for one conversation.

use crate::tool::entities::ToolDescriptor;
use crate::tool::name::AliasMap;
use std::time::{Duration, Instant};

/// Tools selected for a conversation, reusable until `expires_at`.
#[derive(Debug, Clone)]
pub struct DiscoveryCacheEntry {
    pub conversation_id: String,
    pub expires_at: Instant,
    pub tools: Vec<ToolDescriptor>,
    pub alias_map: AliasMap,
}

impl DiscoveryCacheEntry {
    pub fn new(
        conversation_id: impl Into<String>,
        tools: Vec<ToolDescriptor>,
        alias_map: AliasMap,
        ttl: Duration,
        now: Instant,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            expires_at: now + ttl,
            tools,
            alias_map,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}
