//! Shared helpers for tool use cases.

use toolrelay_domain::{ToolArguments, truncate};

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`path`, `source`, `directory_path`, `key`,
/// `question`) first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(args: &ToolArguments) -> String {
    let keys = ["path", "source", "directory_path", "key", "question"];
    for key in &keys {
        if let Some(s) = args.get_string(key) {
            return truncate(s, 50);
        }
    }
    // Fallback: first string value
    for value in args.as_map().values() {
        if let Some(s) = value.as_str() {
            return truncate(s, 50);
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_key_preferred() {
        let args = ToolArguments::new()
            .with("other", "ignored")
            .with("path", "src/main.rs");
        assert_eq!(tool_args_preview(&args), "src/main.rs");
    }

    #[test]
    fn test_key_argument() {
        let args = ToolArguments::new().with("key", "plan");
        assert_eq!(tool_args_preview(&args), "plan");
    }

    #[test]
    fn test_fallback_to_first_string() {
        let args = ToolArguments::new().with("foo", "bar");
        assert_eq!(tool_args_preview(&args), "bar");
    }

    #[test]
    fn test_empty_args() {
        assert_eq!(tool_args_preview(&ToolArguments::new()), "");
    }

    #[test]
    fn test_no_string_values() {
        let args = ToolArguments::new().with("count", 42);
        assert_eq!(tool_args_preview(&args), "");
    }

    #[test]
    fn test_truncation() {
        let args = ToolArguments::new().with("path", "a".repeat(100));
        let result = tool_args_preview(&args);
        assert!(result.chars().count() <= 51);
        assert!(result.ends_with('…'));
    }
}
