//! Path sandbox for filesystem tools.
//!
//! Every file and directory tool resolves caller-supplied paths through
//! [`PathSandbox::resolve`]. A path is accepted only when its canonical form
//! lies under the canonical sandbox root, compared component by component.
//!
//! The path is walked one component at a time from the canonical root.
//! Symlinks are followed with `read_link` whether or not their target exists,
//! so a dangling link cannot smuggle a write outside the root. Components
//! that do not exist yet (a file about to be written) are applied lexically.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a path was refused.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Absolute paths are not allowed: '{0}'")]
    AbsolutePath(String),

    #[error("Path '{0}' resolves outside the sandbox root")]
    Traversal(String),

    #[error("No sandbox root is configured")]
    Unconfigured,

    #[error("Could not resolve '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Confines relative paths to a root directory.
#[derive(Debug, Clone, Default)]
pub struct PathSandbox {
    root: Option<PathBuf>,
}

impl PathSandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A sandbox that refuses every path.
    pub fn unconfigured() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Canonical sandbox root.
    pub fn canonical_root(&self) -> Result<PathBuf, SandboxError> {
        let root = self.root.as_ref().ok_or(SandboxError::Unconfigured)?;
        root.canonicalize().map_err(|source| SandboxError::Io {
            path: root.display().to_string(),
            source,
        })
    }

    /// Resolve `relative` to an absolute path inside the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SandboxError> {
        let candidate = Path::new(relative);
        if candidate.is_absolute() || candidate.has_root() || has_prefix(candidate) {
            warn!(path = relative, "Sandbox rejected absolute path");
            return Err(SandboxError::AbsolutePath(relative.to_string()));
        }

        let root = self.canonical_root()?;
        let resolved = resolve_components(&root, candidate).map_err(|source| {
            SandboxError::Io {
                path: relative.to_string(),
                source,
            }
        })?;

        if resolved.starts_with(&root) {
            debug!(path = relative, resolved = %resolved.display(), "Sandbox resolved path");
            Ok(resolved)
        } else {
            warn!(
                path = relative,
                resolved = %resolved.display(),
                root = %root.display(),
                "Sandbox rejected path outside root"
            );
            Err(SandboxError::Traversal(relative.to_string()))
        }
    }

    /// Whether `path` (already resolved) is the sandbox root itself.
    pub fn is_root(&self, path: &Path) -> bool {
        self.canonical_root().is_ok_and(|root| root == path)
    }

    /// Path relative to the root, for display.
    pub fn display_relative(&self, path: &Path) -> String {
        match self.canonical_root() {
            Ok(root) => match path.strip_prefix(&root) {
                Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
                Ok(rel) => rel.display().to_string(),
                Err(_) => path.display().to_string(),
            },
            Err(_) => path.display().to_string(),
        }
    }
}

fn has_prefix(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::Prefix(_)))
}

/// Symlink hops allowed while resolving one path.
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve `relative` against the canonical `root` without trusting the
/// filesystem to stop at the root.
///
/// Every existing symlink, dangling or not, is replaced by its target.
/// Missing components are appended as-is.
fn resolve_components(root: &Path, relative: &Path) -> io::Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut pending: VecDeque<OsString> = relative
        .components()
        .map(|c| c.as_os_str().to_os_string())
        .collect();
    let mut hops = 0;

    while let Some(part) = pending.pop_front() {
        match Path::new(&part).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::ParentDir) => {
                resolved.pop();
            }
            Some(Component::Prefix(_)) => {
                resolved = PathBuf::from(&part);
            }
            Some(Component::RootDir) => {
                // keep a drive prefix pushed just before
                let prefix = resolved
                    .components()
                    .next()
                    .filter(|c| matches!(c, Component::Prefix(_)) && resolved.components().count() == 1)
                    .map(|c| PathBuf::from(c.as_os_str()));
                resolved = prefix.unwrap_or_default();
                resolved.push(&part);
            }
            Some(Component::Normal(name)) => {
                let next = resolved.join(name);
                match fs::symlink_metadata(&next) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        hops += 1;
                        if hops > MAX_SYMLINK_HOPS {
                            return Err(io::Error::other("too many levels of symbolic links"));
                        }
                        let target = fs::read_link(&next)?;
                        for component in target.components().rev() {
                            pending.push_front(component.as_os_str().to_os_string());
                        }
                    }
                    // Existing entries are already link-free; missing ones stay lexical.
                    _ => resolved = next,
                }
            }
        }
    }
    Ok(resolved)
}
