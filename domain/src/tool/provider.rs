//! Callable side of the tool system
//!
//! A [`Tool`] is the implementation behind a descriptor. Tools are grouped
//! into [`ToolModule`]s; each module is registered together with a sidecar
//! description file named after its id.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               RegistryBuilder                │
//! │  (aggregates modules + sidecar descriptors)  │
//! └──────────────────────────────────────────────┘
//!        │              │              │
//!        ▼              ▼              ▼
//!  ┌──────────┐   ┌──────────┐   ┌──────────┐
//!  │file_tools│   │state_    │   │time_     │   ...
//!  │          │   │tools     │   │tools     │
//!  └──────────┘   └──────────┘   └──────────┘
//!  file_tools.json state_tools.json time_tools.json
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use super::context::ToolContext;
use super::entities::ToolArguments;
use super::value_objects::{ToolError, ToolOutput};

/// A callable tool.
///
/// Arguments have already been checked against the tool's descriptor when
/// `invoke` runs, so implementations only handle semantic errors.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Canonical dotted name (e.g., "file.read")
    fn name(&self) -> &str;

    /// Run the tool
    async fn invoke(&self, args: &ToolArguments, ctx: &ToolContext)
    -> Result<ToolOutput, ToolError>;
}

/// A group of tools loaded together.
pub trait ToolModule: Send + Sync {
    /// Module id; also the stem of the sidecar description file
    ///
    /// Examples: "file_tools", "state_tools"
    fn id(&self) -> &str;

    /// The module's callables.
    ///
    /// `None` means the module cannot provide a mapping (for example it is
    /// misconfigured); the registry skips it with a warning.
    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "test.echo"
        }

        async fn invoke(
            &self,
            args: &ToolArguments,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            let text = args.require_string("text")?;
            Ok(ToolOutput::text(text))
        }
    }

    struct EchoModule;

    impl ToolModule for EchoModule {
        fn id(&self) -> &str {
            "test_tools"
        }

        fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
            Some(vec![Arc::new(EchoTool)])
        }
    }

    #[tokio::test]
    async fn test_tool_invoke() {
        let tool = EchoTool;
        let ctx = ToolContext::new();

        let ok = tool
            .invoke(&ToolArguments::new().with("text", "hi"), &ctx)
            .await
            .unwrap();
        assert_eq!(ok, ToolOutput::Text("hi".to_string()));

        let err = tool.invoke(&ToolArguments::new(), &ctx).await.unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[test]
    fn test_module_mapping() {
        let module = EchoModule;
        let tools = module.mapping().unwrap();
        assert_eq!(module.id(), "test_tools");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "test.echo");
    }
}
