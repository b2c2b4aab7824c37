//! Time tools: time.current_datetime

use chrono::{Local, SecondsFormat};
use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput};

use super::provider::FnTool;

pub const MODULE_ID: &str = "time_tools";
pub const CURRENT_DATETIME: &str = "time.current_datetime";

/// Clock tools.
#[derive(Debug, Clone, Default)]
pub struct TimeTools;

impl ToolModule for TimeTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        Some(vec![FnTool::arc(CURRENT_DATETIME, (), current_datetime)])
    }
}

/// Current local date and time, ISO-8601 with offset.
fn current_datetime(
    _: &(),
    _args: &ToolArguments,
    _ctx: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    Ok(ToolOutput::text(
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    ))
}
