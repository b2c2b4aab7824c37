//! Remote tool server adapter.
//!
//! [`ToolServerClient`] implements both tool ports against an HTTP tool
//! server: `/discover` for selection and `/execute`, `/execute/batch` for
//! invocation.

mod client;

pub use client::{ToolServerClient, ToolServerError};
