//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod embedding;
pub mod llm_gateway;
pub mod tool_discovery;
pub mod tool_executor;
pub mod tool_schema;
