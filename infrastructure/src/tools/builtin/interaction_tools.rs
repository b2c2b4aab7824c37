//! Interaction tools: human.ask

use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput};

use super::provider::FnTool;

pub const MODULE_ID: &str = "interaction_tools";
pub const ASK: &str = "human.ask";

/// Tools that hand control back to the human.
#[derive(Debug, Clone, Default)]
pub struct InteractionTools;

impl ToolModule for InteractionTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        Some(vec![FnTool::arc(ASK, (), ask_user)])
    }
}

/// Ask the user a blocking question. The caller relays it; nothing runs here.
fn ask_user(_: &(), args: &ToolArguments, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    let question = args.require_string("question")?;
    let options = args.get_string_list("options").unwrap_or_default();
    tracing::info!(question, options = ?options, "Tool requested user input");
    Ok(ToolOutput::NeedsInput {
        question: question.to_string(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ask_returns_needs_input() {
        let tool = &InteractionTools.mapping().unwrap()[0];
        let args = ToolArguments::new()
            .with("question", "Which branch?")
            .with("options", serde_json::json!(["main", "dev"]));

        let output = tool.invoke(&args, &ToolContext::new()).await.unwrap();
        assert_eq!(
            output,
            ToolOutput::NeedsInput {
                question: "Which branch?".to_string(),
                options: vec!["main".to_string(), "dev".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_ask_without_options() {
        let tool = &InteractionTools.mapping().unwrap()[0];
        let args = ToolArguments::new().with("question", "Proceed?");
        let output = tool.invoke(&args, &ToolContext::new()).await.unwrap();
        assert!(matches!(output, ToolOutput::NeedsInput { options, .. } if options.is_empty()));
    }
}
