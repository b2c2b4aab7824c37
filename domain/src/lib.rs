//! Domain layer for toolrelay
//!
//! This crate contains the pure types of the tool-invocation pipeline.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A tool is a named, schema-described callable the model may ask to have
//! invoked on its behalf:
//!
//! - **Descriptor**: name, description and JSON-schema parameters, as shown to the model
//! - **Callable**: a [`Tool`] implementation registered under the same dotted name
//! - **Catalog**: the read-only set of descriptors, with API-name alias resolution
//!
//! ## Turns
//!
//! A user turn runs the two-pass protocol: the model is called with a
//! selected subset of tools, any requested tools are executed, and the model
//! is called again with the results. [`TurnTrace`] records what happened.

pub mod conversation;
pub mod core;
pub mod discovery;
pub mod orchestration;
pub mod tool;

// Re-export commonly used types
pub use conversation::entities::{ConversationTurn, Role, last_user_message};
pub use core::{error::DomainError, string::truncate};
pub use discovery::{
    cache::DiscoveryCacheEntry,
    core_tools::{CORE_TOOLS, core_tool_names},
    query::{DEFAULT_RECENT_TURNS, DEFAULT_TOP_K, DiscoveryQuery},
};
pub use orchestration::trace::{TurnPhase, TurnTrace};
pub use tool::{
    context::{TaskScratchpad, ToolContext},
    entities::{
        RAW_ARGUMENTS_KEY, ToolArguments, ToolCallRequest, ToolCatalog, ToolDescriptor,
        ToolInvocation,
    },
    name::{AliasMap, sanitize_tool_name},
    provider::{Tool, ToolModule},
    traits::{ArgumentValidator, SchemaArgumentValidator},
    value_objects::{ExecutionOutcome, ToolError, ToolExecutionResult, ToolOutput},
};
