//! Local tool executor: the concrete implementation of [`ToolExecutorPort`].
//!
//! [`LocalToolExecutor`] invokes tools from a [`ToolRegistry`] in-process.
//!
//! # Execution Path
//!
//! ```text
//! execute(call)
//!   ├─ name not in catalog (dotted or API alias) → failure "not found"
//!   ├─ arguments fail schema validation          → failure "Invalid arguments"
//!   ├─ no callable for the descriptor            → failure "not found"
//!   └─ invoke (panic caught)
//!        ├─ Ok(Text | Json)  → success
//!        ├─ Ok(NeedsInput)   → needs_input
//!        ├─ Err(ToolError)   → failure with the tool's message
//!        └─ panic            → failure "An unexpected error occurred"
//! ```
//!
//! Every path records `duration_ms`; nothing escapes as a panic or an error.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use toolrelay_application::ports::tool_executor::{BatchError, ToolExecutorPort};
use toolrelay_domain::{
    ArgumentValidator, SchemaArgumentValidator, ToolContext, ToolExecutionResult, ToolInvocation,
    ToolOutput,
};
use tracing::{debug, warn};

use super::registry::ToolRegistry;

/// Executor that runs registry tools on the local machine.
#[derive(Debug, Clone)]
pub struct LocalToolExecutor {
    registry: ToolRegistry,
}

impl LocalToolExecutor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn execute_inner(&self, call: &ToolInvocation, ctx: &ToolContext) -> ToolExecutionResult {
        let catalog = self.registry.catalog();
        let Some(descriptor) = catalog.get_resolved(&call.function) else {
            return not_found(&call.function);
        };
        let name = descriptor.name.as_str();

        if let Err(e) = SchemaArgumentValidator.validate(&call.arguments, descriptor) {
            return ToolExecutionResult::failure(
                name,
                format!("Invalid arguments for tool '{}': {}", name, e),
            );
        }

        let Some(tool) = self.registry.callable(name) else {
            return not_found(name);
        };

        debug!(tool = name, "Invoking tool");
        let outcome = AssertUnwindSafe(tool.invoke(&call.arguments, ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(ToolOutput::Text(content))) => ToolExecutionResult::success(name, content),
            Ok(Ok(ToolOutput::Json(value))) => ToolExecutionResult::success(name, value.to_string()),
            Ok(Ok(ToolOutput::NeedsInput { question, options })) => {
                ToolExecutionResult::needs_input(name, question, options)
            }
            Ok(Err(e)) => {
                debug!(tool = name, code = %e.code, error = %e, "Tool reported an error");
                ToolExecutionResult::failure(name, e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = name, error = %message, "Tool panicked");
                ToolExecutionResult::failure(
                    name,
                    format!("An unexpected error occurred in '{}': {}", name, message),
                )
            }
        }
    }
}

fn not_found(name: &str) -> ToolExecutionResult {
    ToolExecutionResult::failure(
        name,
        format!("Tool '{}' not found in the current context.", name),
    )
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}

#[async_trait]
impl ToolExecutorPort for LocalToolExecutor {
    async fn execute(&self, call: &ToolInvocation, ctx: &ToolContext) -> ToolExecutionResult {
        let start = Instant::now();
        let result = self.execute_inner(call, ctx).await;
        result
            .with_tool_call_id(call.tool_call_id.clone())
            .with_duration(start.elapsed().as_millis() as u64)
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn execute_batch(
        &self,
        calls: &[ToolInvocation],
        parallel: bool,
        ctx: &ToolContext,
    ) -> Result<Vec<ToolExecutionResult>, BatchError> {
        if parallel {
            let futures = calls.iter().map(|call| self.execute(call, ctx));
            return Ok(futures::future::join_all(futures).await);
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call, ctx).await);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::builtin;
    use crate::tools::registry::{DescriptorSource, RegistryBuilder};
    use crate::tools::sandbox::PathSandbox;
    use std::fs;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};
    use toolrelay_domain::{ExecutionOutcome, Tool, ToolArguments, ToolError, ToolModule};

    // ==================== Test Mocks ====================

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &str {
            "test.panic"
        }

        async fn invoke(
            &self,
            _args: &ToolArguments,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            panic!("boom");
        }
    }

    struct JsonTool;

    #[async_trait]
    impl Tool for JsonTool {
        fn name(&self) -> &str {
            "test.json"
        }

        async fn invoke(
            &self,
            _args: &ToolArguments,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Json(serde_json::json!({ "answer": 42 })))
        }
    }

    struct TestModule;

    impl ToolModule for TestModule {
        fn id(&self) -> &str {
            "test_tools"
        }

        fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
            Some(vec![Arc::new(PanickingTool), Arc::new(JsonTool)])
        }
    }

    fn executor() -> (TempDir, LocalToolExecutor) {
        let dir = tempdir().unwrap();
        let registry = RegistryBuilder::new()
            .with_modules(builtin::default_modules(Arc::new(PathSandbox::new(dir.path()))))
            .build();
        (dir, LocalToolExecutor::new(registry))
    }

    fn test_executor() -> (TempDir, LocalToolExecutor) {
        let defs = tempdir().unwrap();
        fs::write(
            defs.path().join("test_tools.json"),
            r#"[{"name": "test.panic", "description": "panics"},
                {"name": "test.json", "description": "json"},
                {"name": "test.ghost", "description": "no callable"}]"#,
        )
        .unwrap();
        let registry = RegistryBuilder::new()
            .with_module(TestModule)
            .with_descriptor_source(DescriptorSource::Directory(defs.path().to_path_buf()))
            .build();
        (defs, LocalToolExecutor::new(registry))
    }

    fn call(name: &str, args: ToolArguments) -> ToolInvocation {
        ToolInvocation::new(name, args)
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_unknown_tool() {
        let (_dir, executor) = executor();
        let result = executor
            .execute(&call("nope.nothing", ToolArguments::new()), &ToolContext::new())
            .await;
        assert_eq!(
            result.error(),
            Some("Tool 'nope.nothing' not found in the current context.")
        );
    }

    #[tokio::test]
    async fn test_descriptor_without_callable_is_not_found() {
        let (_dir, executor) = test_executor();
        let result = executor
            .execute(&call("test.ghost", ToolArguments::new()), &ToolContext::new())
            .await;
        assert!(result.error().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_resolves_api_alias() {
        let (_dir, executor) = executor();
        let result = executor
            .execute(
                &call("time_current_datetime", ToolArguments::new()).with_tool_call_id("c1"),
                &ToolContext::new(),
            )
            .await;
        assert!(result.ok());
        assert_eq!(result.function_name, "time.current_datetime");
        assert_eq!(result.tool_call_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (_dir, executor) = executor();
        let ctx = ToolContext::new();

        let missing = executor
            .execute(&call("file.read", ToolArguments::new()), &ctx)
            .await;
        assert_eq!(
            missing.error(),
            Some("Invalid arguments for tool 'file.read': missing required argument 'path'")
        );

        let unexpected = executor
            .execute(
                &call("file.read", ToolArguments::new().with("path", "a").with("mode", "x")),
                &ctx,
            )
            .await;
        assert!(unexpected.error().unwrap().contains("unexpected argument 'mode'"));

        let wrong_type = executor
            .execute(&call("file.read", ToolArguments::new().with("path", 7)), &ctx)
            .await;
        assert!(wrong_type.error().unwrap().contains("should be of type string"));
    }

    #[tokio::test]
    async fn test_raw_arguments_fail_validation() {
        let (_dir, executor) = executor();
        let args = toolrelay_domain::ToolCallRequest::new("c", "file_read", "not json").parse_arguments();
        let result = executor
            .execute(&call("file.read", args), &ToolContext::new())
            .await;
        assert!(result.error().unwrap().starts_with("Invalid arguments for tool 'file.read'"));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failure() {
        let (_dir, executor) = executor();
        let result = executor
            .execute(
                &call("file.read", ToolArguments::new().with("path", "missing.txt")),
                &ToolContext::new(),
            )
            .await;
        assert_eq!(result.error(), Some("File 'missing.txt' not found."));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (_dir, executor) = test_executor();
        let result = executor
            .execute(&call("test.panic", ToolArguments::new()), &ToolContext::new())
            .await;
        assert_eq!(
            result.error(),
            Some("An unexpected error occurred in 'test.panic': boom")
        );
    }

    #[tokio::test]
    async fn test_json_output_is_serialized() {
        let (_dir, executor) = test_executor();
        let result = executor
            .execute(&call("test.json", ToolArguments::new()), &ToolContext::new())
            .await;
        assert_eq!(result.content(), Some(r#"{"answer":42}"#));
    }

    #[tokio::test]
    async fn test_needs_input_outcome() {
        let (_dir, executor) = executor();
        let result = executor
            .execute(
                &call("human.ask", ToolArguments::new().with("question", "Which file?")),
                &ToolContext::new(),
            )
            .await;
        assert!(result.ok());
        assert!(matches!(
            result.outcome,
            ExecutionOutcome::NeedsInput { ref question, .. } if question == "Which file?"
        ));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let (dir, executor) = executor();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let calls = vec![
            call("file.read", ToolArguments::new().with("path", "a.txt")).with_tool_call_id("1"),
            call("file.read", ToolArguments::new().with("path", "gone.txt")).with_tool_call_id("2"),
            call("time.current_datetime", ToolArguments::new()).with_tool_call_id("3"),
        ];

        for parallel in [false, true] {
            let results = executor
                .execute_batch(&calls, parallel, &ToolContext::new())
                .await
                .unwrap();
            let ids: Vec<_> = results
                .iter()
                .map(|r| r.tool_call_id.clone().unwrap())
                .collect();
            assert_eq!(ids, vec!["1", "2", "3"]);
            assert_eq!(results[0].content(), Some("alpha"));
            assert!(!results[1].ok());
            assert!(results[2].ok());
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_panics() {
        let (_dir, executor) = test_executor();
        let calls = vec![
            call("test.json", ToolArguments::new()),
            call("test.panic", ToolArguments::new()),
            call("test.json", ToolArguments::new()),
        ];
        let results = executor
            .execute_batch(&calls, true, &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].ok());
        assert!(!results[1].ok());
        assert!(results[2].ok());
    }

    #[tokio::test]
    async fn test_batch_calls_share_scratchpad() {
        let (_dir, executor) = executor();
        let calls = vec![
            call(
                "state.set",
                ToolArguments::new().with("key", "k").with("value", "v"),
            ),
            call("state.get", ToolArguments::new().with("key", "k")),
        ];
        let results = executor
            .execute_batch(&calls, false, &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(results[1].content(), Some("Value for key 'k': \"v\""));
    }
}
