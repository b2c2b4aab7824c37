//! Directory tools: directory.create, directory.delete, directory.tree

use std::fs;
use std::path::Path;
use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput};

use super::provider::{FnTool, io_error, sandboxed};
use crate::tools::sandbox::PathSandbox;

pub const MODULE_ID: &str = "directory_tools";
pub const CREATE: &str = "directory.create";
pub const DELETE: &str = "directory.delete";
pub const TREE: &str = "directory.tree";

/// Default depth of `directory.tree`
const DEFAULT_TREE_DEPTH: i64 = 3;

/// Directory tools confined to a sandbox root.
#[derive(Debug, Clone)]
pub struct DirectoryTools {
    sandbox: Arc<PathSandbox>,
}

impl DirectoryTools {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

impl ToolModule for DirectoryTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        Some(vec![
            FnTool::arc(CREATE, self.sandbox.clone(), create_directory),
            FnTool::arc(DELETE, self.sandbox.clone(), delete_directory),
            FnTool::arc(TREE, self.sandbox.clone(), directory_tree),
        ])
    }
}

type Sandbox = Arc<PathSandbox>;

fn create_directory(
    sandbox: &Sandbox,
    args: &ToolArguments,
    _: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    let name = args.require_string("directory_name")?;
    let target = sandboxed(sandbox, name)?;

    if target.is_file() {
        return Err(ToolError::invalid_argument(format!(
            "'{}' already exists as a file.",
            name
        )));
    }
    fs::create_dir_all(&target).map_err(|e| io_error("create directory", name, e))?;

    Ok(ToolOutput::Text(format!(
        "Success: Directory '{}' created or already exists.",
        name
    )))
}

fn delete_directory(
    sandbox: &Sandbox,
    args: &ToolArguments,
    _: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    let name = args.require_string("directory_name")?;
    let target = sandboxed(sandbox, name)?;

    if !target.is_dir() {
        return Err(ToolError::not_found(format!(
            "'{}' is not a valid directory or does not exist.",
            name
        )));
    }
    if sandbox.is_root(&target) {
        tracing::warn!(path = name, "Refused to delete the sandbox root");
        return Err(ToolError::permission_denied(
            "Deleting the root workspace directory is not allowed.",
        ));
    }
    fs::remove_dir_all(&target).map_err(|e| io_error("delete directory", name, e))?;

    Ok(ToolOutput::Text(format!(
        "Success: Directory '{}' and all its contents have been deleted.",
        name
    )))
}

fn directory_tree(
    sandbox: &Sandbox,
    args: &ToolArguments,
    _: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    let path = args.get_string("path").unwrap_or(".");
    let max_depth = args.get_i64("max_depth").unwrap_or(DEFAULT_TREE_DEPTH);
    let start = sandboxed(sandbox, path)?;

    if !start.is_dir() {
        return Err(ToolError::invalid_argument(format!(
            "Start path '{}' is not a directory.",
            path
        )));
    }

    let display = path.trim_matches(|c| c == '.' || c == '/');
    let display = if display.is_empty() { "." } else { display };
    let mut lines = vec![format!("Listing for: /{}", display)];
    walk(&start, 0, max_depth, &mut lines).map_err(|e| io_error("list tree of", path, e))?;

    Ok(ToolOutput::Text(lines.join("\n")))
}

/// Depth-first listing: files of a directory first, then its subdirectories.
/// A negative `max_depth` means unlimited.
fn walk(dir: &Path, level: i64, max_depth: i64, lines: &mut Vec<String>) -> std::io::Result<()> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if file_type.is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    files.sort();
    dirs.sort();

    let sub_indent = "    ".repeat((level + 1) as usize);
    for file in &files {
        lines.push(format!("{}├── {}", sub_indent, file));
    }

    if max_depth >= 0 && level >= max_depth {
        if !dirs.is_empty() {
            lines.push(format!("{}└── [...]", sub_indent));
        }
        return Ok(());
    }

    for name in dirs {
        lines.push(format!("{}└── {}/", sub_indent, name));
        walk(&dir.join(&name), level + 1, max_depth, lines)?;
    }
    Ok(())
}
