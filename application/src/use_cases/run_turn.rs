//! Run Turn use case.
//!
//! Executes one user turn with the two-pass tool protocol:
//!
//! 1. Select tools for the conversation ([`ToolSelector`])
//! 2. Call the model with the selected tool schemas
//! 3. If the model answered directly, stop
//! 4. Otherwise execute every requested call (batch first, then one by one)
//! 5. Append the tool results and call the model again without tools
//!
//! The returned [`TurnTrace`] records the selection, both raw model payloads
//! and every tool result.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{CompletionRequest, GatewayError, LlmGateway};
use crate::ports::tool_executor::{BatchError, ToolExecutorPort};
use crate::ports::tool_schema::ToolSchemaPort;
use crate::use_cases::select_tools::ToolSelector;
use crate::use_cases::tool_helpers::tool_args_preview;
use std::sync::Arc;
use thiserror::Error;
use toolrelay_domain::{
    ConversationTurn, Role, TaskScratchpad, ToolContext, ToolExecutionResult, ToolInvocation,
    TurnTrace, truncate,
};
use tracing::{debug, info, warn};

/// Errors that end a turn.
///
/// Tool failures never do; they are reported to the model as results.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Conversation is empty")]
    EmptyConversation,
}

/// Input for the [`RunTurnUseCase`].
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    /// Keys the selection cache
    pub conversation_id: String,
    /// Conversation so far, ending with the user's turn
    pub conversation: Vec<ConversationTurn>,
    /// Skip the selection cache for this turn
    pub force_refresh_tools: bool,
}

impl RunTurnInput {
    pub fn new(conversation_id: impl Into<String>, conversation: Vec<ConversationTurn>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            conversation,
            force_refresh_tools: false,
        }
    }

    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh_tools = force;
        self
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct RunTurnOutput {
    /// Final assistant text
    pub text: String,
    pub trace: TurnTrace,
    /// The conversation extended with every turn produced here
    pub conversation: Vec<ConversationTurn>,
}

/// Use case for running one user turn.
pub struct RunTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    selector: Arc<ToolSelector>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    tool_schema: Arc<dyn ToolSchemaPort>,
    params: ExecutionParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        selector: Arc<ToolSelector>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        tool_schema: Arc<dyn ToolSchemaPort>,
        params: ExecutionParams,
    ) -> Self {
        Self {
            gateway,
            selector,
            tool_executor,
            tool_schema,
            params,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn selector(&self) -> &ToolSelector {
        &self.selector
    }

    /// Run the turn.
    pub async fn execute(&self, input: RunTurnInput) -> Result<RunTurnOutput, RunTurnError> {
        let conversation_id = input.conversation_id.clone();
        let result = self.run(input).await;
        if let Err(e) = &result {
            warn!(conversation_id = %conversation_id, error = %e, "Turn failed");
            self.conversation_logger.log(ConversationEvent::new(
                conversation_id,
                "turn_failed",
                serde_json::json!({ "error": e.to_string() }),
            ));
        }
        result
    }

    async fn run(&self, input: RunTurnInput) -> Result<RunTurnOutput, RunTurnError> {
        if input.conversation.is_empty() {
            return Err(RunTurnError::EmptyConversation);
        }
        let conversation_id = input.conversation_id;

        info!(
            conversation_id = %conversation_id,
            model = self.gateway.model_name(),
            "Starting turn"
        );
        self.conversation_logger.log(ConversationEvent::new(
            conversation_id.as_str(),
            "turn_started",
            serde_json::json!({
                "model": self.gateway.model_name(),
                "turns": input.conversation.len(),
            }),
        ));

        // 1. Select tools
        let selection = self
            .selector
            .select(
                &conversation_id,
                &input.conversation,
                None,
                input.force_refresh_tools,
            )
            .await;
        let selected_names = selection.tool_names();
        debug!(tools = ?selected_names, source = ?selection.source, "Tools selected");
        self.conversation_logger.log(ConversationEvent::new(
            conversation_id.as_str(),
            "tools_selected",
            serde_json::json!({
                "source": format!("{:?}", selection.source),
                "tools": selected_names,
            }),
        ));

        let mut conversation = input.conversation;
        if let Some(prompt) = &self.params.system_prompt
            && conversation.first().is_none_or(|t| t.role != Role::System)
        {
            conversation.insert(0, ConversationTurn::system(prompt.clone()));
        }

        // 2. First model call, with tools
        let schemas = self.tool_schema.tools_schema(&selection.tools);
        let request = CompletionRequest::new(conversation.clone())
            .with_tools(schemas, self.params.tool_choice.clone());
        let first = self.gateway.complete(request).await?;
        self.log_model_response(&conversation_id, "first", &first.raw);

        let trace = TurnTrace::direct(
            selected_names,
            selection.alias_map.clone(),
            first.raw.clone(),
        );

        // 3. Direct answer
        if !first.has_tool_calls() {
            let text = first.text_content();
            conversation.push(ConversationTurn::assistant(text.clone()));
            info!(conversation_id = %conversation_id, "Turn completed without tool calls");
            self.log_completed(&conversation_id, &trace);
            return Ok(RunTurnOutput {
                text,
                trace,
                conversation,
            });
        }

        // 4. Execute requested tools
        let calls = first.tool_calls.clone();
        conversation.push(ConversationTurn::assistant_tool_calls(
            first.content.clone(),
            calls.clone(),
        ));

        let invocations: Vec<ToolInvocation> = calls
            .iter()
            .map(|call| {
                let canonical = selection.alias_map.canonical(&call.function_name);
                ToolInvocation::from_request(call, canonical)
            })
            .collect();

        let ctx = ToolContext::new()
            .with_scratchpad(Arc::new(TaskScratchpad::new()))
            .with_conversation_id(conversation_id.clone());

        let (results, batch_error) = self.execute_calls(&invocations, &ctx).await;

        for (call, result) in calls.iter().zip(&results) {
            self.conversation_logger.log(ConversationEvent::new(
                conversation_id.as_str(),
                "tool_result",
                serde_json::json!({
                    "tool_call_id": call.id,
                    "function": result.function_name,
                    "ok": result.ok(),
                    "duration_ms": result.duration_ms,
                    "preview": truncate(&result.tool_message_content(), 200),
                }),
            ));
            conversation.push(ConversationTurn::tool_result(
                call.id.clone(),
                call.function_name.clone(),
                result.tool_message_content(),
            ));
        }

        // 5. Final model call, without tools
        let final_response = self
            .gateway
            .complete(CompletionRequest::new(conversation.clone()))
            .await?;
        self.log_model_response(&conversation_id, "final", &final_response.raw);

        let text = final_response.text_content();
        conversation.push(ConversationTurn::assistant(text.clone()));

        let trace = trace
            .with_tool_results(results, final_response.raw)
            .with_batch_error(batch_error);

        info!(
            conversation_id = %conversation_id,
            tool_calls = calls.len(),
            "Turn completed"
        );
        self.log_completed(&conversation_id, &trace);

        Ok(RunTurnOutput {
            text,
            trace,
            conversation,
        })
    }

    /// Execute all calls, returning results in call order and the batch
    /// error that forced a sequential re-run, if any.
    async fn execute_calls(
        &self,
        invocations: &[ToolInvocation],
        ctx: &ToolContext,
    ) -> (Vec<ToolExecutionResult>, Option<String>) {
        let mut batch_error = None;

        if self.params.try_batch_execute
            && invocations.len() > 1
            && self.tool_executor.supports_batch()
        {
            debug!(calls = invocations.len(), "Executing tool calls as a batch");
            let batch = self
                .tool_executor
                .execute_batch(invocations, self.params.parallel_batch, ctx)
                .await
                .and_then(|results| {
                    if results.len() == invocations.len() {
                        Ok(results)
                    } else {
                        Err(BatchError::ResultCountMismatch {
                            expected: invocations.len(),
                            actual: results.len(),
                        })
                    }
                });
            match batch {
                Ok(results) => return (with_call_ids(invocations, results), None),
                Err(e) => {
                    warn!(error = %e, "Batch execution failed; running calls one by one");
                    batch_error = Some(e.to_string());
                }
            }
        }

        let mut results = Vec::with_capacity(invocations.len());
        for call in invocations {
            debug!(
                tool = %call.function,
                args = %tool_args_preview(&call.arguments),
                "Executing tool call"
            );
            results.push(self.tool_executor.execute(call, ctx).await);
        }
        (with_call_ids(invocations, results), batch_error)
    }

    fn log_model_response(&self, conversation_id: &str, pass: &str, raw: &serde_json::Value) {
        self.conversation_logger.log(ConversationEvent::new(
            conversation_id,
            "model_response",
            serde_json::json!({
                "pass": pass,
                "model": self.gateway.model_name(),
                "response": raw,
            }),
        ));
    }

    fn log_completed(&self, conversation_id: &str, trace: &TurnTrace) {
        self.conversation_logger.log(ConversationEvent::new(
            conversation_id,
            "turn_completed",
            serde_json::json!({
                "phase": trace.phase.as_str(),
                "tool_results": trace.tool_results.len(),
                "batch_error": trace.batch_error,
            }),
        ));
    }
}

/// Fill in missing result ids from the matching call.
fn with_call_ids(
    invocations: &[ToolInvocation],
    results: Vec<ToolExecutionResult>,
) -> Vec<ToolExecutionResult> {
    results
        .into_iter()
        .zip(invocations)
        .map(|(result, call)| {
            if result.tool_call_id.is_some() {
                result
            } else {
                result.with_tool_call_id(call.tool_call_id.clone())
            }
        })
        .collect()
}
