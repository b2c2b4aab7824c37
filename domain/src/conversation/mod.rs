//! Conversation turns exchanged with the model.
//!
//! The working conversation of a turn is append-only: the orchestration loop
//! adds the assistant's tool-call turn and one `tool` turn per result, in
//! request order, and never rewrites earlier turns.

pub mod entities;

pub use entities::{ConversationTurn, Role, last_user_message};
