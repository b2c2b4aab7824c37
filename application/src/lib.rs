//! Application layer for toolrelay
//!
//! This crate contains use cases, port definitions, and execution parameters.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    embedding::{EmbeddingError, EmbeddingPort},
    llm_gateway::{CompletionRequest, GatewayError, LlmGateway, LlmResponse, ToolChoice},
    tool_discovery::{Discovery, DiscoveryError, DiscoveryRequest, ToolDiscoveryPort},
    tool_executor::{BatchError, ToolExecutorPort},
    tool_schema::ToolSchemaPort,
};
pub use use_cases::rank_tools::EmbeddingToolRanker;
pub use use_cases::run_turn::{RunTurnError, RunTurnInput, RunTurnOutput, RunTurnUseCase};
pub use use_cases::select_tools::{Selection, SelectionSource, ToolSelector};
