//! Local tool implementations
//!
//! Tools are grouped into modules, each pairing callables with a sidecar
//! description file:
//! - `builtin`: time, state, interaction, file and directory tools
//! - `tool_definitions/`: the sidecar JSON for the builtin modules
//!
//! The [`RegistryBuilder`] joins both halves into a [`ToolRegistry`], which
//! [`LocalToolExecutor`] invokes in-process. Every filesystem tool resolves
//! its paths through a shared [`PathSandbox`].

pub mod builtin;
pub mod sandbox;

mod executor;
mod registry;
mod schema;

pub use executor::LocalToolExecutor;
pub use registry::{DescriptorError, DescriptorSource, RegistryBuilder, RegistryStats, ToolRegistry};
pub use sandbox::{PathSandbox, SandboxError};
pub use schema::JsonSchemaToolConverter;

use std::sync::Arc;

/// Build the registry of builtin tools rooted at `sandbox`.
pub fn default_registry(sandbox: Arc<PathSandbox>, source: DescriptorSource) -> ToolRegistry {
    RegistryBuilder::new()
        .with_modules(builtin::default_modules(sandbox))
        .with_descriptor_source(source)
        .build()
}
