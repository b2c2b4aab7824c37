//! Tool Executor port
//!
//! Defines the interface for invoking tools, one at a time or in batches.

use async_trait::async_trait;
use thiserror::Error;
use toolrelay_domain::{ToolContext, ToolExecutionResult, ToolInvocation};

/// Batch-level failure. Individual tool failures are never reported here;
/// they are results.
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    #[error("Batch execution is not supported by this executor")]
    Unsupported,

    #[error("Batch transport error: {0}")]
    Transport(String),

    #[error("Batch returned {actual} results for {expected} calls")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Batch result for call '{0}' does not match exactly one request")]
    UnmatchedResult(String),
}

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Execute one call. Never fails: every problem is a failed result.
    async fn execute(&self, call: &ToolInvocation, ctx: &ToolContext) -> ToolExecutionResult;

    /// Whether [`execute_batch`](Self::execute_batch) is worth trying
    fn supports_batch(&self) -> bool {
        false
    }

    /// Execute several calls, returning results in input order.
    ///
    /// With `parallel` the calls may run concurrently; ordering of the
    /// returned results is unaffected.
    async fn execute_batch(
        &self,
        calls: &[ToolInvocation],
        parallel: bool,
        ctx: &ToolContext,
    ) -> Result<Vec<ToolExecutionResult>, BatchError> {
        let _ = (calls, parallel, ctx);
        Err(BatchError::Unsupported)
    }
}
