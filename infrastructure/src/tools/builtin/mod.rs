//! Builtin tool modules
//!
//! Each module pairs with a sidecar `<module id>.json` under
//! `tools/tool_definitions/`, embedded in the binary.

pub mod directory_tools;
pub mod file_tools;
pub mod interaction_tools;
pub mod state_tools;
pub mod system_tools;
pub mod time_tools;

mod provider;

pub use directory_tools::DirectoryTools;
pub use file_tools::FileTools;
pub use interaction_tools::InteractionTools;
pub use state_tools::StateTools;
pub use system_tools::SystemTools;
pub use time_tools::TimeTools;

use crate::tools::sandbox::PathSandbox;
use std::sync::Arc;
use toolrelay_domain::ToolModule;

/// Every builtin module, filesystem and command tools confined to `sandbox`.
pub fn default_modules(sandbox: Arc<PathSandbox>) -> Vec<Arc<dyn ToolModule>> {
    vec![
        Arc::new(TimeTools),
        Arc::new(StateTools),
        Arc::new(InteractionTools),
        Arc::new(FileTools::new(sandbox.clone())),
        Arc::new(DirectoryTools::new(sandbox.clone())),
        Arc::new(SystemTools::new(sandbox)),
    ]
}
