//! Orchestration domain module
//!
//! Records how a user turn went through the two-pass protocol:
//!
//! ```text
//! discover → first model call ─┬─ no tool calls ──────────────▶ NoToolCalls
//!                              └─ tool calls → execute → final ▶ ToolCallsExecuted
//! ```

pub mod trace;

pub use trace::{TurnPhase, TurnTrace};
