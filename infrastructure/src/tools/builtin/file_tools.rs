//! File tools: file.save, file.read, file.append, file.delete, file.list,
//! file.find, fs.move
//!
//! Every path argument goes through the [`PathSandbox`]; messages echo the
//! caller's relative path, never the resolved absolute one.

use glob::{Pattern, glob};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use toolrelay_domain::{Tool, ToolArguments, ToolContext, ToolError, ToolModule, ToolOutput};

use super::provider::{FnTool, io_error, sandboxed};
use crate::tools::sandbox::PathSandbox;

pub const MODULE_ID: &str = "file_tools";
pub const SAVE: &str = "file.save";
pub const READ: &str = "file.read";
pub const APPEND: &str = "file.append";
pub const DELETE: &str = "file.delete";
pub const LIST: &str = "file.list";
pub const FIND: &str = "file.find";
pub const MOVE: &str = "fs.move";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum file size searched by content (5 MB)
const MAX_SEARCH_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of find results
const MAX_RESULTS: usize = 1000;

/// File tools confined to a sandbox root.
#[derive(Debug, Clone)]
pub struct FileTools {
    sandbox: Arc<PathSandbox>,
}

impl FileTools {
    pub fn new(sandbox: Arc<PathSandbox>) -> Self {
        Self { sandbox }
    }
}

impl ToolModule for FileTools {
    fn id(&self) -> &str {
        MODULE_ID
    }

    fn mapping(&self) -> Option<Vec<Arc<dyn Tool>>> {
        let s = &self.sandbox;
        Some(vec![
            FnTool::arc(SAVE, s.clone(), save_file),
            FnTool::arc(READ, s.clone(), read_file),
            FnTool::arc(APPEND, s.clone(), append_to_file),
            FnTool::arc(DELETE, s.clone(), delete_file),
            FnTool::arc(LIST, s.clone(), list_files),
            FnTool::arc(FIND, s.clone(), find_files),
            FnTool::arc(MOVE, s.clone(), move_item),
        ])
    }
}

type Sandbox = Arc<PathSandbox>;

fn create_parent(path: &Path, display: &str) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create parent of", display, e))?;
    }
    Ok(())
}

fn save_file(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let path = args.require_string("path")?;
    let content = args.require_string("content")?;
    let target = sandboxed(sandbox, path)?;

    if target.is_dir() {
        return Err(ToolError::invalid_argument(format!(
            "Path '{}' is a directory, not a file.",
            path
        )));
    }
    create_parent(&target, path)?;
    fs::write(&target, content).map_err(|e| io_error("save file", path, e))?;

    tracing::debug!(path, bytes = content.len(), "Saved file");
    Ok(ToolOutput::Text(format!(
        "Successfully saved content to the file '{}'.",
        path
    )))
}

fn read_file(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let path = args.require_string("path")?;
    let target = sandboxed(sandbox, path)?;

    if !target.exists() {
        return Err(ToolError::not_found(format!("File '{}' not found.", path)));
    }
    if !target.is_file() {
        return Err(ToolError::invalid_argument(format!(
            "Path '{}' is a directory, not a file.",
            path
        )));
    }

    let metadata = fs::metadata(&target).map_err(|e| io_error("read", path, e))?;
    if metadata.len() > MAX_READ_SIZE {
        return Err(ToolError::invalid_argument(format!(
            "File too large ({} bytes). Maximum size is {} bytes",
            metadata.len(),
            MAX_READ_SIZE
        )));
    }

    let content = fs::read_to_string(&target).map_err(|e| io_error("read file", path, e))?;

    // Optional line window
    let offset = args.get_i64("offset").unwrap_or(0).max(0) as usize;
    let limit = args.get_i64("limit").map(|l| l.max(0) as usize);
    if offset == 0 && limit.is_none() {
        return Ok(ToolOutput::Text(content));
    }

    let lines: Vec<&str> = content.lines().collect();
    if offset >= lines.len() {
        return Ok(ToolOutput::Text(String::new()));
    }
    let end = limit
        .map(|l| offset.saturating_add(l).min(lines.len()))
        .unwrap_or(lines.len());
    Ok(ToolOutput::Text(lines[offset..end].join("\n")))
}

fn append_to_file(
    sandbox: &Sandbox,
    args: &ToolArguments,
    _: &ToolContext,
) -> Result<ToolOutput, ToolError> {
    let path = args.require_string("path")?;
    let content = args.require_string("content")?;
    let target = sandboxed(sandbox, path)?;

    create_parent(&target, path)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&target)
        .map_err(|e| io_error("append to file", path, e))?;
    write!(file, "\n{}", content).map_err(|e| io_error("append to file", path, e))?;

    Ok(ToolOutput::Text(format!(
        "Success: Content appended to '{}'.",
        path
    )))
}

fn delete_file(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let path = args.require_string("path")?;
    let target = sandboxed(sandbox, path)?;

    if !target.exists() {
        return Err(ToolError::not_found(format!("File '{}' not found.", path)));
    }
    if !target.is_file() {
        return Err(ToolError::invalid_argument(format!(
            "Path '{}' is a directory, not a file.",
            path
        )));
    }
    fs::remove_file(&target).map_err(|e| io_error("delete file", path, e))?;

    Ok(ToolOutput::Text(format!(
        "Success: File '{}' was deleted.",
        path
    )))
}

fn move_item(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let source = args.require_string("source")?;
    let destination = args.require_string("destination")?;
    let from = sandboxed(sandbox, source)?;
    let to = sandboxed(sandbox, destination)?;

    if !from.exists() {
        return Err(ToolError::not_found(format!(
            "Source '{}' not found.",
            source
        )));
    }
    if sandbox.is_root(&from) {
        return Err(ToolError::permission_denied(
            "Moving the root workspace directory is not allowed.",
        ));
    }

    // Moving onto an existing directory moves into it
    let to = if to.is_dir() {
        match from.file_name() {
            Some(name) => to.join(name),
            None => to,
        }
    } else {
        to
    };
    create_parent(&to, destination)?;
    fs::rename(&from, &to).map_err(|e| io_error("move", source, e))?;

    Ok(ToolOutput::Text(format!(
        "Success: Moved '{}' to '{}'.",
        source, destination
    )))
}

fn list_files(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let path = args.get_string("path").unwrap_or(".");
    let target = sandboxed(sandbox, path)?;

    if !target.is_dir() {
        return Err(ToolError::invalid_argument(format!(
            "The path '{}' is not a directory.",
            path
        )));
    }

    let mut entries = 0usize;
    let mut files = Vec::new();
    for entry in fs::read_dir(&target).map_err(|e| io_error("list files in", path, e))? {
        let entry = entry.map_err(|e| io_error("list files in", path, e))?;
        entries += 1;
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    if entries == 0 {
        return Ok(ToolOutput::Text(format!(
            "No files or directories found in '{}'.",
            path
        )));
    }
    if files.is_empty() {
        return Ok(ToolOutput::Text(format!(
            "No files found in '{}' (only subdirectories).",
            path
        )));
    }
    files.sort();
    Ok(ToolOutput::Text(format!(
        "Files available in '{}':\n- {}",
        path,
        files.join("\n- ")
    )))
}

fn find_files(sandbox: &Sandbox, args: &ToolArguments, _: &ToolContext) -> Result<ToolOutput, ToolError> {
    let name_pattern = args.get_string("name_pattern").filter(|s| !s.is_empty());
    let content_regex = args.get_string("content_regex").filter(|s| !s.is_empty());
    if name_pattern.is_none() && content_regex.is_none() {
        return Err(ToolError::invalid_argument(
            "You must provide at least a name_pattern or a content_regex.",
        ));
    }

    let name_pattern = name_pattern
        .map(Pattern::new)
        .transpose()
        .map_err(|e| ToolError::invalid_argument(format!("Invalid name pattern: {}", e)))?;
    let content_regex = content_regex
        .map(Regex::new)
        .transpose()
        .map_err(|e| ToolError::invalid_argument(format!("Invalid regular expression: {}", e)))?;

    let root = sandboxed(sandbox, ".")?;
    let walk = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let entries = glob(&walk)
        .map_err(|e| ToolError::execution_failed(format!("Could not search files: {}", e)))?;

    let mut found = Vec::new();
    for path in entries.flatten() {
        if found.len() >= MAX_RESULTS {
            break;
        }
        if !path.is_file() {
            continue;
        }
        // Symlinks may point outside the root
        if !path.canonicalize().is_ok_and(|p| p.starts_with(&root)) {
            continue;
        }
        if let Some(pattern) = &name_pattern {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !pattern.matches(&name) {
                continue;
            }
        }
        if let Some(regex) = &content_regex {
            let small_enough = fs::metadata(&path).is_ok_and(|m| m.len() <= MAX_SEARCH_FILE_SIZE);
            if !small_enough {
                continue;
            }
            let Ok(bytes) = fs::read(&path) else {
                continue;
            };
            if !regex.is_match(&String::from_utf8_lossy(&bytes)) {
                continue;
            }
        }
        found.push(sandbox.display_relative(&path));
    }

    if found.is_empty() {
        return Ok(ToolOutput::text("No files found matching your criteria."));
    }
    found.sort();
    found.dedup();
    Ok(ToolOutput::Text(format!(
        "Found the following files:\n- {}",
        found.join("\n- ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, Harness) {
        let dir = tempdir().unwrap();
        let tools = Harness::new(Arc::new(PathSandbox::new(dir.path())));
        (dir, tools)
    }

    struct Harness(Vec<Arc<dyn Tool>>);

    impl Harness {
        fn new(sandbox: Arc<PathSandbox>) -> Self {
            Self(FileTools::new(sandbox).mapping().unwrap())
        }

        async fn run(&self, name: &str, args: ToolArguments) -> Result<String, ToolError> {
            let tool = self.0.iter().find(|t| t.name() == name).unwrap();
            tool.invoke(&args, &ToolContext::new())
                .await
                .map(|o| match o {
                    ToolOutput::Text(t) => t,
                    other => panic!("unexpected output {:?}", other),
                })
        }
    }

    fn args() -> ToolArguments {
        ToolArguments::new()
    }

    #[tokio::test]
    async fn test_save_then_read() {
        let (dir, tools) = setup();
        let msg = tools
            .run(SAVE, args().with("path", "notes/a.txt").with("content", "hello"))
            .await
            .unwrap();
        assert_eq!(msg, "Successfully saved content to the file 'notes/a.txt'.");
        assert_eq!(
            fs::read_to_string(dir.path().join("notes/a.txt")).unwrap(),
            "hello"
        );

        let content = tools
            .run(READ, args().with("path", "notes/a.txt"))
            .await
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[tokio::test]
    async fn test_read_line_window() {
        let (dir, tools) = setup();
        fs::write(dir.path().join("lines.txt"), "l0\nl1\nl2\nl3").unwrap();
        let content = tools
            .run(
                READ,
                args().with("path", "lines.txt").with("offset", 1).with("limit", 2),
            )
            .await
            .unwrap();
        assert_eq!(content, "l1\nl2");
    }

    #[tokio::test]
    async fn test_read_huge_limit_reads_to_end() {
        let (dir, tools) = setup();
        fs::write(dir.path().join("lines.txt"), "l0\nl1\nl2").unwrap();
        let content = tools
            .run(
                READ,
                args()
                    .with("path", "lines.txt")
                    .with("offset", 1)
                    .with("limit", i64::MAX),
            )
            .await
            .unwrap();
        assert_eq!(content, "l1\nl2");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let (_dir, tools) = setup();
        let err = tools
            .run(READ, args().with("path", "nope.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
        assert_eq!(err.message, "File 'nope.txt' not found.");
    }

    #[tokio::test]
    async fn test_traversal_is_denied() {
        let (_dir, tools) = setup();
        let err = tools
            .run(READ, args().with("path", "../../etc/passwd"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");

        let err = tools
            .run(SAVE, args().with("path", "/tmp/x.txt").with("content", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_append() {
        let (dir, tools) = setup();
        fs::write(dir.path().join("log.txt"), "first").unwrap();
        let msg = tools
            .run(APPEND, args().with("path", "log.txt").with("content", "second"))
            .await
            .unwrap();
        assert_eq!(msg, "Success: Content appended to 'log.txt'.");
        assert_eq!(
            fs::read_to_string(dir.path().join("log.txt")).unwrap(),
            "first\nsecond"
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let (dir, tools) = setup();
        fs::write(dir.path().join("gone.txt"), "x").unwrap();
        let msg = tools
            .run(DELETE, args().with("path", "gone.txt"))
            .await
            .unwrap();
        assert_eq!(msg, "Success: File 'gone.txt' was deleted.");
        assert!(!dir.path().join("gone.txt").exists());

        fs::create_dir(dir.path().join("d")).unwrap();
        let err = tools.run(DELETE, args().with("path", "d")).await.unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_move() {
        let (dir, tools) = setup();
        fs::write(dir.path().join("a.txt"), "x").unwrap();
        let msg = tools
            .run(
                MOVE,
                args().with("source", "a.txt").with("destination", "sub/b.txt"),
            )
            .await
            .unwrap();
        assert_eq!(msg, "Success: Moved 'a.txt' to 'sub/b.txt'.");
        assert!(dir.path().join("sub/b.txt").exists());

        let err = tools
            .run(
                MOVE,
                args().with("source", "sub/b.txt").with("destination", "../b.txt"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_list() {
        let (dir, tools) = setup();
        assert_eq!(
            tools.run(LIST, args()).await.unwrap(),
            "No files or directories found in '.'."
        );

        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(
            tools.run(LIST, args()).await.unwrap(),
            "No files found in '.' (only subdirectories)."
        );

        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        assert_eq!(
            tools.run(LIST, args()).await.unwrap(),
            "Files available in '.':\n- a.txt\n- b.txt"
        );
    }

    #[tokio::test]
    async fn test_find_by_name_and_content() {
        let (dir, tools) = setup();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/lib.rs"), "pub mod x;").unwrap();
        fs::write(dir.path().join("README.md"), "fn in docs").unwrap();

        let by_name = tools
            .run(FIND, args().with("name_pattern", "*.rs"))
            .await
            .unwrap();
        assert_eq!(
            by_name,
            "Found the following files:\n- src/lib.rs\n- src/main.rs"
        );

        let both = tools
            .run(
                FIND,
                args().with("name_pattern", "*.rs").with("content_regex", r"fn\s+main"),
            )
            .await
            .unwrap();
        assert_eq!(both, "Found the following files:\n- src/main.rs");

        let none = tools
            .run(FIND, args().with("content_regex", "nothing-here"))
            .await
            .unwrap();
        assert_eq!(none, "No files found matching your criteria.");
    }

    #[tokio::test]
    async fn test_find_requires_a_criterion() {
        let (_dir, tools) = setup();
        let err = tools.run(FIND, args()).await.unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");

        let err = tools
            .run(FIND, args().with("content_regex", "("))
            .await
            .unwrap_err();
        assert!(err.message.starts_with("Invalid regular expression"));
    }
}
