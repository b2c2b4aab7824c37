//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for toolrelay
#[derive(Parser, Debug)]
#[command(name = "toolrelay")]
#[command(author, version, about = "Tool-using LLM turns with sandboxed builtin tools")]
#[command(long_about = r#"
toolrelay runs one conversation turn against an OpenAI-compatible model,
offering it a relevant subset of tools:

1. Selection: tools are ranked against the conversation (embeddings or a
   tool server) and the core tools are always added
2. First call: the model answers directly or requests tool calls
3. Tools: calls run in the sandbox, batched when possible
4. Final call: the model answers with the tool results in view

Configuration files are loaded from (in priority order):
1. TOOLRELAY_* environment variables
2. --config <path>        Explicit config file
3. ./toolrelay.toml       Project-level config
4. ~/.config/toolrelay/config.toml   Global config

Example:
  toolrelay ask "What time is it?"
  toolrelay tools select "find TODOs in the notes folder" --k 3
  toolrelay tools exec file.list --args '{"directory_path": "."}'
  toolrelay toolserver health
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one turn: select tools, call the model, run tools, answer
    Ask {
        /// The user message
        message: String,

        /// Conversation id for the discovery cache (random if omitted)
        #[arg(long, value_name = "ID")]
        conversation: Option<String>,

        /// Bypass the discovery cache
        #[arg(long)]
        force_refresh: bool,

        /// Print the turn trace after the answer
        #[arg(long)]
        trace: bool,

        /// Print the answer and trace as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect and run tools
    Tools {
        #[command(subcommand)]
        command: ToolsCommand,
    },

    /// Query or administer the remote tool server
    Toolserver {
        #[command(subcommand)]
        command: ToolserverCommand,
    },

    /// Show configuration sources and the merged configuration
    Config,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ToolserverCommand {
    /// Check that the tool server is up
    Health,

    /// Show the tool server's active configuration
    Config,

    /// Ask the tool server to rescan its tool modules
    Reload,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// List registered tools and registry health
    List,

    /// Run tool selection only for a message
    Select {
        message: String,

        /// Number of ranked tools to request
        #[arg(long)]
        k: Option<usize>,
    },

    /// Invoke one tool through the local executor
    Exec {
        /// Dotted or API-safe tool name (file.read or file_read)
        name: String,

        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,
    },
}
