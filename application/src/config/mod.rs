//! Application-level configuration.
//!
//! - [`ExecutionParams`]: tool selection and turn control (top-k, cache TTL, batching)

pub mod execution_params;

pub use execution_params::ExecutionParams;
