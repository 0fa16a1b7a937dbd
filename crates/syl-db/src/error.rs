//! Database error types for syl-db.

use syl_core::repository::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A stored value could not be interpreted (e.g. an unknown status).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Detect lock contention and dropped connections.
///
/// Matches on the message because libSQL surfaces local and remote
/// failures through different variants. Constraint and syntax errors are
/// never transient.
#[must_use]
pub fn is_transient_libsql_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("SQLITE_BUSY")
        || msg.contains("unable to acquire shared lock")
        || msg.contains("connection reset")
}

impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NoResult => Self::NotFound("no matching row".into()),
            DatabaseError::InvalidState(msg) => Self::InvalidState(msg),
            DatabaseError::LibSql(e) if is_transient_libsql_error(&e) => {
                Self::Unavailable(e.to_string())
            }
            other => Self::Other(anyhow::Error::new(other)),
        }
    }
}
