//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod rank_tools;
pub mod run_turn;
pub mod select_tools;
pub(crate) mod tool_helpers;
