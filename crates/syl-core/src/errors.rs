//! Cross-cutting error types for syl-core.
//!
//! Domain errors for the workflow engine live in `syl-workflow`; store and
//! blob errors live next to their traits in [`crate::repository`] and
//! [`crate::blob`].

use thiserror::Error;

/// Errors raised while interpreting stored or user-supplied values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A status string is not one of the five lifecycle states.
    #[error("Unknown workflow status: {0}")]
    UnknownStatus(String),

    /// A role name is not one of the six fixed roles.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// An audit action string is not recognized.
    #[error("Unknown workflow action: {0}")]
    UnknownAction(String),
}
