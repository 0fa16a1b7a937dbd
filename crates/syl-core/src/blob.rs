//! Object storage seam.
//!
//! The workflow crate uploads and deletes document bytes through
//! [`BlobStore`]; `syl-storage` provides the `object_store`-backed
//! implementation.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Transient backend failure; the caller may retry.
    #[error("Object store unavailable: {0}")]
    Unavailable(String),

    /// The backend cannot perform this operation (e.g. signing on a store
    /// without credentials).
    #[error("Unsupported by object store: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Blob storage for uploaded syllabus documents.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Bucket recorded on every [`FileAsset`](crate::entities::FileAsset) row.
    fn bucket(&self) -> &str;

    /// Store `bytes` and return the object path actually written.
    ///
    /// `path_hint` is `<dir>/<original filename>`. Implementations keep the
    /// directory and extension but may choose a unique file stem.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        path_hint: &str,
        mime_type: &str,
    ) -> Result<String, BlobError>;

    /// Time-limited download URL for `path`.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError>;

    /// Remove `path`. Returns `false` when the object was already gone.
    async fn delete(&self, path: &str) -> Result<bool, BlobError>;
}
