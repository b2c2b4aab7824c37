//! Tool discovery rules
//!
//! Discovery narrows the full catalog to the tools worth offering the model
//! for the current turn. The rules here are pure: how the retrieval query is
//! built from the conversation, which tools are always offered, and when a
//! cached selection is still usable.

pub mod cache;
pub mod core_tools;
pub mod query;

pub use cache::DiscoveryCacheEntry;
pub use core_tools::{CORE_TOOLS, core_tool_names};
pub use query::{DEFAULT_RECENT_TURNS, DEFAULT_TOP_K, DiscoveryQuery};
