//! # syl-storage
//!
//! Blob storage for uploaded syllabus documents, built on `object_store`.
//!
//! [`ObjectBlobStore`] implements [`syl_core::blob::BlobStore`] over three
//! backends:
//! - Cloudflare R2 (S3 API) with presigned GET URLs, when `[r2]` is configured
//! - the local filesystem under `storage.local_root`, with `file://` URLs
//! - an in-memory store for tests

mod error;
mod keys;

pub use error::StorageError;

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use syl_config::{R2Config, SylConfig};
use syl_core::blob::{BlobError, BlobStore};

/// How download URLs are produced for a backend.
enum Signing {
    Presigned(Arc<dyn Signer>),
    LocalFile(PathBuf),
    Memory,
}

pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
    signing: Signing,
    bucket: String,
}

impl ObjectBlobStore {
    /// Ephemeral store; URLs use a `memory://` scheme.
    #[must_use]
    pub fn in_memory(bucket: impl Into<String>) -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            signing: Signing::Memory,
            bucket: bucket.into(),
        }
    }

    /// Filesystem store rooted at `root`, created if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory cannot be created or resolved.
    pub fn local(root: impl AsRef<FsPath>, bucket: impl Into<String>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        let store = LocalFileSystem::new_with_prefix(&root)?;
        Ok(Self {
            store: Arc::new(store),
            signing: Signing::LocalFile(root),
            bucket: bucket.into(),
        })
    }

    /// S3-compatible store against Cloudflare R2.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` if `r2` lacks credentials.
    pub fn from_r2(r2: &R2Config) -> Result<Self, StorageError> {
        if !r2.is_configured() {
            return Err(StorageError::Config(
                "r2 requires account_id, access_key_id, secret_access_key and bucket_name".into(),
            ));
        }
        let s3 = AmazonS3Builder::new()
            .with_endpoint(r2.endpoint_url())
            .with_bucket_name(&r2.bucket_name)
            .with_access_key_id(&r2.access_key_id)
            .with_secret_access_key(&r2.secret_access_key)
            .with_region("auto")
            .build()?;
        let s3 = Arc::new(s3);
        Ok(Self {
            store: Arc::clone(&s3) as Arc<dyn ObjectStore>,
            signing: Signing::Presigned(s3),
            bucket: r2.bucket_name.clone(),
        })
    }

    /// R2 when configured, otherwise the local filesystem store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the selected backend cannot be built.
    pub fn from_config(config: &SylConfig) -> Result<Self, StorageError> {
        if config.r2.is_configured() {
            tracing::debug!(bucket = %config.r2.bucket_name, "using R2 blob store");
            Self::from_r2(&config.r2)
        } else {
            tracing::debug!(root = %config.storage.local_root, "using local blob store");
            Self::local(&config.storage.local_root, config.storage.bucket.clone())
        }
    }

    /// Raw bytes of an object, for export and tests.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the object is missing or unreadable.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let location = Path::parse(path).map_err(object_store::Error::from)?;
        let bytes = self.store.get(&location).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, mime_type: &str) -> Result<(), StorageError> {
        let location = Path::parse(key).map_err(object_store::Error::from)?;
        // Local filesystems cannot persist object attributes.
        let opts = match self.signing {
            Signing::LocalFile(_) => PutOptions::default(),
            Signing::Presigned(_) | Signing::Memory => {
                let mut attributes = Attributes::new();
                attributes.insert(Attribute::ContentType, mime_type.to_string().into());
                PutOptions {
                    attributes,
                    ..PutOptions::default()
                }
            }
        };
        self.store
            .put_opts(&location, PutPayload::from(bytes), opts)
            .await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<bool, StorageError> {
        let location = Path::parse(path).map_err(object_store::Error::from)?;
        match self.store.head(&location).await {
            Ok(_) => {}
            Err(object_store::Error::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        match self.store.delete(&location).await {
            Ok(()) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn url_for(&self, path: &str, ttl: Duration) -> Result<String, StorageError> {
        let location = Path::parse(path).map_err(object_store::Error::from)?;
        match &self.signing {
            Signing::Presigned(signer) => {
                let url = signer
                    .signed_url(reqwest::Method::GET, &location, ttl)
                    .await?;
                Ok(url.to_string())
            }
            Signing::LocalFile(root) => {
                self.store.head(&location).await?;
                Ok(format!("file://{}/{location}", root.display()))
            }
            Signing::Memory => {
                self.store.head(&location).await?;
                Ok(format!(
                    "memory://{}/{location}?expires_in={}",
                    self.bucket,
                    ttl.as_secs()
                ))
            }
        }
    }
}

impl BlobStore for ObjectBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        path_hint: &str,
        mime_type: &str,
    ) -> Result<String, BlobError> {
        let key = keys::object_key(path_hint, mime_type);
        let size = bytes.len();
        self.put(&key, bytes, mime_type).await?;
        tracing::debug!(path = %key, size, "object stored");
        Ok(key)
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, BlobError> {
        Ok(self.url_for(path, ttl).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, BlobError> {
        let removed = self.remove(path).await?;
        if !removed {
            tracing::debug!(path, "delete of missing object");
        }
        Ok(removed)
    }
}
