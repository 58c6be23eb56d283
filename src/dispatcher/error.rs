//! Dispatcher error definitions.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the filter registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Filter name is empty or whitespace.
    #[error("filter name must not be empty")]
    EmptyName,

    /// Filter has no patterns at all.
    #[error("filter '{name}' has no patterns")]
    NoPatterns { name: String },

    /// One of the filter's patterns is the empty string.
    #[error("filter '{name}' contains an empty pattern")]
    EmptyPattern { name: String },

    /// A filter with the same name is already registered.
    #[error("filter '{name}' is already registered")]
    DuplicateName { name: String },
}

/// Errors raised by a single classification call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Not every filter reported before the deadline.
    #[error("classification timed out after {elapsed:?} with {} filter(s) pending", .pending.len())]
    Timeout {
        pending: Vec<String>,
        elapsed: Duration,
    },

    /// A filter task ended without reporting (panicked or was cancelled).
    #[error("{} filter(s) stopped without reporting: {}", .pending.len(), .pending.join(", "))]
    FilterLost { pending: Vec<String> },
}

impl ClassifyError {
    /// Names of the filters that never reported.
    pub fn pending(&self) -> &[String] {
        match self {
            ClassifyError::Timeout { pending, .. } => pending,
            ClassifyError::FilterLost { pending } => pending,
        }
    }
}
