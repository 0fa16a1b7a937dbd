//! Storage error types.

use syl_core::blob::BlobError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// The backend could not be built from configuration.
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for BlobError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectStore(object_store::Error::NotFound { path, .. }) => {
                Self::NotFound(path)
            }
            StorageError::ObjectStore(
                e @ (object_store::Error::NotImplemented
                | object_store::Error::NotSupported { .. }),
            ) => Self::Unsupported(e.to_string()),
            StorageError::ObjectStore(
                e @ (object_store::Error::AlreadyExists { .. }
                | object_store::Error::Precondition { .. }
                | object_store::Error::InvalidPath { .. }
                | object_store::Error::PermissionDenied { .. }
                | object_store::Error::Unauthenticated { .. }),
            ) => Self::Other(anyhow::Error::new(e)),
            StorageError::ObjectStore(e) => Self::Unavailable(e.to_string()),
            StorageError::Io(e) => Self::Unavailable(e.to_string()),
            StorageError::Config(msg) => Self::Unsupported(msg),
        }
    }
}
