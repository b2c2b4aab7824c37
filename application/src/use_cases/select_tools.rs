//! Tool selection use case.
//!
//! Decides which tools the model sees on a turn:
//!
//! ```text
//! select()
//!   ├─ fresh cache entry, no force_refresh → cached tools
//!   ├─ no user turn / no discovery / discovery error → core tools (not cached)
//!   └─ discovery ok → ranked tools ∪ core tools → cached for the TTL
//! ```
//!
//! Core tools present in the catalog are always part of the result.

use crate::config::ExecutionParams;
use crate::ports::tool_discovery::{DiscoveryRequest, ToolDiscoveryPort};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use toolrelay_domain::{
    AliasMap, ConversationTurn, DiscoveryCacheEntry, DiscoveryQuery, ToolCatalog, ToolDescriptor,
};
use tracing::{debug, info, warn};

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Reused from the per-conversation cache
    Cache,
    /// Fresh discovery result
    Discovery,
    /// Discovery was skipped or failed; only core tools
    CoreFallback,
}

/// Tools chosen for a turn.
#[derive(Debug, Clone)]
pub struct Selection {
    pub tools: Vec<ToolDescriptor>,
    pub alias_map: AliasMap,
    pub source: SelectionSource,
}

impl Selection {
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }
}

/// Retrieval-based tool selection with a per-conversation TTL cache.
pub struct ToolSelector {
    catalog: Arc<ToolCatalog>,
    discovery: Option<Arc<dyn ToolDiscoveryPort>>,
    params: ExecutionParams,
    cache: Mutex<HashMap<String, DiscoveryCacheEntry>>,
}

impl ToolSelector {
    pub fn new(catalog: Arc<ToolCatalog>, params: ExecutionParams) -> Self {
        Self {
            catalog,
            discovery: None,
            params,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn ToolDiscoveryPort>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Select tools for the current turn of `conversation_id`.
    ///
    /// `k` overrides the configured number of ranked tools for this call.
    /// A fresh cache entry is returned as stored, whatever `k` it was built with.
    pub async fn select(
        &self,
        conversation_id: &str,
        conversation: &[ConversationTurn],
        k: Option<usize>,
        force_refresh: bool,
    ) -> Selection {
        let now = Instant::now();

        if !force_refresh && let Some(entry) = self.cached(conversation_id, now) {
            debug!(
                conversation_id,
                tools = entry.tools.len(),
                "Tool selection served from cache"
            );
            return Selection {
                tools: entry.tools,
                alias_map: entry.alias_map,
                source: SelectionSource::Cache,
            };
        }

        let Some(query) = DiscoveryQuery::from_conversation(conversation, self.params.recent_turns)
        else {
            debug!(conversation_id, "No user turn; offering core tools only");
            return self.core_fallback();
        };

        let Some(discovery) = &self.discovery else {
            warn!("No discovery service configured; offering core tools only");
            return self.core_fallback();
        };

        let request = DiscoveryRequest {
            conversation_id: conversation_id.to_string(),
            query,
            conversation: conversation.to_vec(),
            k: k.unwrap_or(self.params.k_tools).max(1),
        };

        let discovered = match discovery.discover(&request).await {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "Tool discovery failed; offering core tools only");
                return self.core_fallback();
            }
        };

        let ranked: Vec<String> = discovered.tools.iter().map(|t| t.name.clone()).collect();
        info!(conversation_id, tools = ?ranked, "Discovery selected tools");

        let tools = self.with_core_tools(discovered.tools);
        let mut alias_map = discovered.alias_map;
        for tool in &tools {
            alias_map.register(&tool.name);
        }

        let ttl = discovered.cache_ttl.unwrap_or(self.params.cache_ttl);
        if let Ok(mut cache) = self.cache.lock() {
            if ttl.is_zero() {
                cache.remove(conversation_id);
            } else {
                cache.insert(
                    conversation_id.to_string(),
                    DiscoveryCacheEntry::new(
                        conversation_id,
                        tools.clone(),
                        alias_map.clone(),
                        ttl,
                        now,
                    ),
                );
            }
        }

        Selection {
            tools,
            alias_map,
            source: SelectionSource::Discovery,
        }
    }

    /// Drop the cached selection of one conversation.
    pub fn invalidate(&self, conversation_id: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(conversation_id);
        }
    }

    /// Drop every cached selection.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, conversation_id: &str, now: Instant) -> Option<DiscoveryCacheEntry> {
        let mut cache = self.cache.lock().ok()?;
        match cache.get(conversation_id) {
            Some(entry) if entry.is_fresh(now) => Some(entry.clone()),
            Some(_) => {
                cache.remove(conversation_id);
                None
            }
            None => None,
        }
    }

    fn core_fallback(&self) -> Selection {
        let tools = self.with_core_tools(Vec::new());
        let alias_map = AliasMap::from_names(tools.iter().map(|t| t.name.as_str()));
        Selection {
            tools,
            alias_map,
            source: SelectionSource::CoreFallback,
        }
    }

    /// Append catalog core tools missing from `tools`.
    fn with_core_tools(&self, mut tools: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
        let mut present: HashSet<String> = tools.iter().map(|t| t.name.clone()).collect();
        let mut added = Vec::new();
        for name in &self.params.core_tools {
            if present.contains(name) {
                continue;
            }
            if let Some(descriptor) = self.catalog.get(name) {
                present.insert(name.clone());
                tools.push(descriptor.clone());
                added.push(name.as_str());
            }
        }
        if !added.is_empty() {
            debug!(core_tools = ?added, "Added core tools to selection");
        }
        tools
    }
}
