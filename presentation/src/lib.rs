//! Presentation layer for toolrelay
//!
//! This crate contains the CLI definition and console output formatting.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ToolsCommand, ToolserverCommand};
pub use output::console::ConsoleFormatter;
