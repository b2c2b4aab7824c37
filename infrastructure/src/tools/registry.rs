//! Tool Registry
//!
//! The [`RegistryBuilder`] aggregates [`ToolModule`]s with their sidecar
//! description files into a [`ToolRegistry`]: the read-only
//! [`ToolCatalog`] the selector ranks over, plus the name → callable map the
//! executor dispatches through.
//!
//! # Usage
//!
//! ```ignore
//! use toolrelay_infrastructure::tools::{RegistryBuilder, builtin, PathSandbox};
//!
//! let sandbox = Arc::new(PathSandbox::new("./workspace"));
//! let registry = RegistryBuilder::new()
//!     .with_modules(builtin::default_modules(sandbox))
//!     .build();
//!
//! assert!(registry.catalog().contains("file.read"));
//! ```
//!
//! # Tolerance
//!
//! The two halves are built independently and mismatches never abort the
//! build:
//!
//! - A module without a mapping is skipped; its sidecar is still read
//! - A missing or malformed sidecar drops that module's descriptors only
//! - Duplicate names keep the first registration
//! - A callable without a descriptor is invisible to selection
//! - A descriptor without a callable reports "not found" when invoked

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use toolrelay_domain::{DomainError, Tool, ToolCatalog, ToolDescriptor, ToolModule};
use tracing::{debug, info, warn};

/// Error reading a sidecar description file.
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("No sidecar description found for module '{0}'")]
    Missing(String),

    #[error("Failed to read sidecar '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed sidecar for module '{module}': {source}")]
    Malformed {
        module: String,
        #[source]
        source: DomainError,
    },
}

/// Where sidecar description files come from.
#[derive(Debug, Clone, Default)]
pub enum DescriptorSource {
    /// The description files compiled into the binary
    #[default]
    Embedded,
    /// `<dir>/<module id>.json` on disk
    Directory(PathBuf),
}

const EMBEDDED_DEFINITIONS: &[(&str, &str)] = &[
    (
        "time_tools",
        include_str!("tool_definitions/time_tools.json"),
    ),
    (
        "state_tools",
        include_str!("tool_definitions/state_tools.json"),
    ),
    (
        "interaction_tools",
        include_str!("tool_definitions/interaction_tools.json"),
    ),
    (
        "file_tools",
        include_str!("tool_definitions/file_tools.json"),
    ),
    (
        "directory_tools",
        include_str!("tool_definitions/directory_tools.json"),
    ),
    (
        "system_tools",
        include_str!("tool_definitions/system_tools.json"),
    ),
];

impl DescriptorSource {
    /// Load and parse the sidecar of `module_id`.
    pub fn load(&self, module_id: &str) -> Result<Vec<ToolDescriptor>, DescriptorError> {
        let text = match self {
            DescriptorSource::Embedded => EMBEDDED_DEFINITIONS
                .iter()
                .find(|(id, _)| *id == module_id)
                .map(|(_, text)| (*text).to_string())
                .ok_or_else(|| DescriptorError::Missing(module_id.to_string()))?,
            DescriptorSource::Directory(dir) => {
                let path = dir.join(format!("{}.json", module_id));
                match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(DescriptorError::Missing(module_id.to_string()));
                    }
                    Err(source) => {
                        return Err(DescriptorError::Io {
                            path: path.display().to_string(),
                            source,
                        });
                    }
                }
            }
        };

        ToolDescriptor::parse_document(&text).map_err(|source| DescriptorError::Malformed {
            module: module_id.to_string(),
            source,
        })
    }
}

/// Builds a [`ToolRegistry`] from tool modules.
#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<Arc<dyn ToolModule>>,
    source: DescriptorSource,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool module
    pub fn with_module<M: ToolModule + 'static>(mut self, module: M) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    /// Register several modules (Arc version)
    pub fn with_modules(mut self, modules: Vec<Arc<dyn ToolModule>>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn with_descriptor_source(mut self, source: DescriptorSource) -> Self {
        self.source = source;
        self
    }

    /// Build the registry. Building again starts from scratch.
    pub fn build(&self) -> ToolRegistry {
        let mut catalog = ToolCatalog::new();
        let mut callables: HashMap<String, Arc<dyn Tool>> = HashMap::new();
        let mut callable_order = Vec::new();
        let mut stats = RegistryStats::default();

        for module in &self.modules {
            let module_id = module.id();
            stats.modules += 1;

            match module.mapping() {
                Some(tools) => {
                    for tool in tools {
                        let name = tool.name().to_string();
                        if callables.contains_key(&name) {
                            warn!(tool = %name, module = module_id, "Duplicate tool callable ignored");
                            continue;
                        }
                        debug!(tool = %name, module = module_id, "Registered tool");
                        callable_order.push(name.clone());
                        callables.insert(name, tool);
                    }
                }
                None => {
                    warn!(module = module_id, "Tool module has no mapping, skipping its callables");
                    stats.skipped_modules.push(module_id.to_string());
                }
            }

            match self.source.load(module_id) {
                Ok(descriptors) => {
                    for descriptor in descriptors {
                        if let Err(e) = catalog.insert(descriptor) {
                            warn!(module = module_id, error = %e, "Duplicate tool descriptor ignored");
                        }
                    }
                }
                Err(e) => {
                    warn!(module = module_id, error = %e, "Skipping tool descriptions");
                    stats.modules_without_descriptions.push(module_id.to_string());
                }
            }
        }

        stats.callables_without_descriptor = callable_order
            .iter()
            .filter(|name| !catalog.contains(name))
            .cloned()
            .collect();
        stats.descriptors_without_callable = catalog
            .names()
            .filter(|name| !callables.contains_key(*name))
            .map(str::to_string)
            .collect();

        for name in &stats.callables_without_descriptor {
            warn!(tool = %name, "Tool has no description and will not be offered to the model");
        }
        for name in &stats.descriptors_without_callable {
            warn!(tool = %name, "Tool description has no implementation");
        }

        stats.callables = callables.len();
        stats.descriptors = catalog.len();
        info!(
            modules = stats.modules,
            callables = stats.callables,
            descriptors = stats.descriptors,
            "Tool registry built"
        );

        ToolRegistry {
            catalog: Arc::new(catalog),
            callables,
            stats,
        }
    }
}

/// Catalog plus callables, immutable after build.
#[derive(Clone)]
pub struct ToolRegistry {
    catalog: Arc<ToolCatalog>,
    callables: HashMap<String, Arc<dyn Tool>>,
    stats: RegistryStats,
}

impl ToolRegistry {
    pub fn catalog(&self) -> Arc<ToolCatalog> {
        self.catalog.clone()
    }

    /// Callable registered under a canonical name
    pub fn callable(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.callables.get(name).cloned()
    }

    /// Name → retrieval text, in catalog order
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.catalog.retrieval_texts()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("descriptors", &self.catalog.len())
            .field("callables", &self.callables.len())
            .finish()
    }
}

/// Statistics about the registry
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    pub modules: usize,
    pub callables: usize,
    pub descriptors: usize,
    pub skipped_modules: Vec<String>,
    pub modules_without_descriptions: Vec<String>,
    pub callables_without_descriptor: Vec<String>,
    pub descriptors_without_callable: Vec<String>,
}

impl RegistryStats {
    pub fn is_consistent(&self) -> bool {
        self.skipped_modules.is_empty()
            && self.modules_without_descriptions.is_empty()
            && self.callables_without_descriptor.is_empty()
            && self.descriptors_without_callable.is_empty()
    }
}
