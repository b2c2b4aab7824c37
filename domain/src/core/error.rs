//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Malformed descriptor document: {0}")]
    MalformedDescriptorDocument(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

impl DomainError {
    /// Check if this error was caused by a name collision rather than bad input
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DomainError::DuplicateTool(_))
    }
}
