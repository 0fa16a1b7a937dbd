//! Error taxonomy for workflow, file, and engagement operations.

use syl_core::blob::BlobError;
use syl_core::repository::RepositoryError;
use thiserror::Error;

/// Coarse classification callers branch on (exit codes, HTTP status, retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Validation,
    Unavailable,
    Internal,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The entity is not in a state that allows the operation, or another
    /// writer changed it first.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The actor may not perform the operation. Never says which check failed.
    #[error("Not authorized to perform this action")]
    Unauthorized,

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Transient infrastructure failure; retrying may succeed.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unavailable(_) => ErrorKind::Unavailable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Conflicts are retryable after re-reading state; unavailability after a pause.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unavailable | ErrorKind::Conflict)
    }
}

impl From<RepositoryError> for WorkflowError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Unavailable(msg) => Self::Unavailable(msg),
            RepositoryError::InvalidState(msg) => Self::Internal(msg),
            RepositoryError::Other(e) => Self::Internal(format!("{e:#}")),
        }
    }
}

impl From<BlobError> for WorkflowError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound(path) => Self::NotFound(format!("object {path}")),
            BlobError::Unavailable(msg) => Self::Unavailable(msg),
            BlobError::Unsupported(msg) => Self::Internal(msg),
            BlobError::Other(e) => Self::Internal(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(WorkflowError::Conflict("x".into()).is_retryable());
        assert!(WorkflowError::Unavailable("x".into()).is_retryable());
        assert!(!WorkflowError::Unauthorized.is_retryable());
        assert!(!WorkflowError::validation("reason", "blank").is_retryable());
        assert!(!WorkflowError::Internal("x".into()).is_retryable());
        assert!(!WorkflowError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn unauthorized_message_is_generic() {
        assert_eq!(
            WorkflowError::Unauthorized.to_string(),
            "Not authorized to perform this action"
        );
    }

    #[test]
    fn repository_errors_map_by_kind() {
        let unavailable: WorkflowError = RepositoryError::Unavailable("locked".into()).into();
        assert_eq!(unavailable.kind(), ErrorKind::Unavailable);
        let corrupt: WorkflowError = RepositoryError::InvalidState("status".into()).into();
        assert_eq!(corrupt.kind(), ErrorKind::Internal);
        let missing: WorkflowError = RepositoryError::NotFound("row".into()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
