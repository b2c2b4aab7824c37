//! Console output for turns, selections and tool results

use colored::Colorize;
use toolrelay_application::{Selection, SelectionSource};
use toolrelay_domain::{ExecutionOutcome, ToolCatalog, ToolExecutionResult, TurnTrace, truncate};

/// Longest tool output shown in a trace
const TRACE_PREVIEW: usize = 200;

/// Formats toolrelay results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// The assistant's answer
    pub fn format_answer(text: &str) -> String {
        format!("{}\n{}\n", "Answer:".cyan().bold(), text)
    }

    /// Selected tools, per-call results and the branch taken
    pub fn format_trace(trace: &TurnTrace) -> String {
        let mut output = Self::section_header("Turn Trace");
        output.push_str(&format!("{} {}\n", "Phase:".cyan().bold(), trace.phase));
        output.push_str(&format!(
            "{} {}\n",
            "Tools offered:".cyan().bold(),
            trace.selected_tools.join(", ")
        ));

        if let Some(error) = &trace.batch_error {
            output.push_str(&format!(
                "{} {}\n",
                "Batch fallback:".yellow().bold(),
                error
            ));
        }

        if !trace.tool_results.is_empty() {
            output.push_str(&format!("\n{}\n", "Tool calls:".cyan().bold()));
            for result in &trace.tool_results {
                output.push_str(&Self::format_result_line(result));
                output.push('\n');
            }
        }
        output
    }

    /// One line per result: status marker, name, duration, preview
    pub fn format_result_line(result: &ToolExecutionResult) -> String {
        let (marker, detail) = match &result.outcome {
            ExecutionOutcome::Success { content } => ("ok".green(), content.clone()),
            ExecutionOutcome::Failure { error } => ("failed".red(), error.clone()),
            ExecutionOutcome::NeedsInput { question, .. } => {
                ("needs input".yellow(), question.clone())
            }
        };
        let detail = truncate(&detail.replace('\n', " "), TRACE_PREVIEW);
        format!(
            "  [{}] {} ({}ms) {}",
            marker,
            result.function_name.bold(),
            result.duration_ms,
            detail.dimmed()
        )
    }

    /// Full output of a single tool invocation
    pub fn format_tool_result(result: &ToolExecutionResult) -> String {
        match &result.outcome {
            ExecutionOutcome::Success { content } => content.clone(),
            ExecutionOutcome::Failure { error } => format!("{} {}", "Error:".red().bold(), error),
            ExecutionOutcome::NeedsInput { question, options } => {
                let mut output = format!("{} {}", "Question:".yellow().bold(), question);
                for option in options {
                    output.push_str(&format!("\n  - {}", option));
                }
                output
            }
        }
    }

    /// Tools chosen for a message and where they came from
    pub fn format_selection(selection: &Selection) -> String {
        let source = match selection.source {
            SelectionSource::Cache => "cache",
            SelectionSource::Discovery => "discovery",
            SelectionSource::CoreFallback => "core tools only",
        };
        let mut output = format!(
            "{} {} ({})\n",
            "Selected tools:".cyan().bold(),
            selection.tools.len(),
            source.dimmed()
        );
        for tool in &selection.tools {
            output.push_str(&format!("  * {}\n", tool.name));
        }

        output.push_str(&format!("\n{}\n", "Alias map:".cyan().bold()));
        for (alias, canonical) in selection.alias_map.iter() {
            output.push_str(&format!("  {} -> {}\n", alias, canonical));
        }
        output
    }

    /// Every tool in the catalog with the first line of its description
    pub fn format_catalog(catalog: &ToolCatalog) -> String {
        let mut output = Self::section_header(&format!("Tools ({})", catalog.len()));
        for tool in catalog.all() {
            let summary = tool.description.lines().next().unwrap_or_default();
            output.push_str(&format!(
                "  {:<28} {}\n",
                tool.name.bold(),
                truncate(summary, 80).dimmed()
            ));
        }
        output
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
