//! Tool domain module
//!
//! This module defines the core abstractions of the **Tool System**: how a
//! model-requested action is described, resolved, validated and reported.
//!
//! # Overview
//!
//! ```text
//! ┌────────────────┐    ┌─────────────────┐    ┌─────────────────────┐
//! │ ToolCatalog    │───▶│ ToolCallRequest │───▶│ ToolExecutionResult │
//! │ (descriptors)  │    │ (model request) │    │ (success / failure  │
//! └──────┬─────────┘    └─────────────────┘    │  / needs_input)     │
//!        │                                     └─────────────────────┘
//!        ├─ "file_read" → "file.read"   (API-safe alias)
//!        └─ "file.read" → ToolDescriptor
//! ```
//!
//! # Tool Names
//!
//! Canonical tool names are dotted (`file.read`, `state.set`). Model APIs
//! only accept `[A-Za-z0-9_-]`, so every name is exposed under a sanitized
//! alias and resolved back through [`AliasMap`] or [`ToolCatalog::resolve`].
//!
//! # Key Types
//!
//! - [`ToolDescriptor`]: Schema for a single tool (name, description, JSON-schema parameters)
//! - [`ToolCatalog`]: Ordered, read-only descriptor set with alias resolution
//! - [`ToolCallRequest`]: A model's request to invoke a tool (raw argument string)
//! - [`ToolExecutionResult`]: Uniform outcome of an invocation
//! - [`Tool`]: The callable side of a tool
//! - [`ToolModule`]: A group of callables loaded together with one sidecar file
//! - [`ArgumentValidator`]: Pure check of arguments against a descriptor
//!
//! # Architecture
//!
//! - **Domain** (this module): Pure definitions, no I/O
//! - **Application** (`ToolExecutorPort`): Port trait for tool execution
//! - **Infrastructure** (`LocalToolExecutor`): Execution against the registry,
//!   with filesystem tools confined by the path sandbox

pub mod context;
pub mod entities;
pub mod name;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use context::{TaskScratchpad, ToolContext};
pub use entities::{ToolArguments, ToolCallRequest, ToolCatalog, ToolDescriptor, ToolInvocation};
pub use name::{AliasMap, sanitize_tool_name};
pub use provider::{Tool, ToolModule};
pub use traits::{ArgumentValidator, SchemaArgumentValidator};
pub use value_objects::{ExecutionOutcome, ToolError, ToolExecutionResult, ToolOutput};
