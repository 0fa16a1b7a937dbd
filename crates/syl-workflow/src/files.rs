//! Document attachments on syllabus versions.
//!
//! Blob and metadata writes cannot share a transaction, so uploads write
//! the blob first and the row second. If the row write fails the blob is
//! deleted again with bounded retries; a blob that survives every attempt
//! is logged as orphaned and the original error is still returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use syl_config::SylConfig;
use syl_core::blob::BlobStore;
use syl_core::entities::{FileAsset, NewFileAsset, SyllabusVersion};
use syl_core::enums::WorkflowStatus;
use syl_core::identity::Actor;
use syl_core::repository::{FileRepository, SyllabusRepository, SyllabusStore};
use tracing::{debug, error, info, warn};

use crate::error::WorkflowError;
use crate::policy::{can_edit_file, can_view_file};
use crate::txn::finish;

const MIN_URL_TTL: Duration = Duration::from_secs(1);

/// Retry schedule for deleting a blob whose metadata write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further one.
    pub base_delay: Duration,
    /// Backoff is capped here.
    pub max_delay: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl CleanupPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Tunables for [`FileService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileServiceConfig {
    pub cleanup: CleanupPolicy,
    /// Longest signed URL lifetime a caller may request.
    pub max_url_ttl: Duration,
}

impl Default for FileServiceConfig {
    fn default() -> Self {
        Self {
            cleanup: CleanupPolicy::default(),
            max_url_ttl: Duration::from_secs(604_800),
        }
    }
}

impl FileServiceConfig {
    #[must_use]
    pub const fn from_config(config: &SylConfig) -> Self {
        Self {
            cleanup: CleanupPolicy {
                max_attempts: config.workflow.cleanup_max_attempts,
                base_delay: config.workflow.cleanup_base_delay(),
                max_delay: config.workflow.cleanup_max_delay(),
            },
            max_url_ttl: config.storage.max_url_ttl(),
        }
    }
}

/// An incoming document.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    /// Defaults to `filename` on upload and to the existing name on replace.
    pub display_name: Option<String>,
}

impl FileUpload {
    fn validate(&self) -> Result<(), WorkflowError> {
        if self.bytes.is_empty() {
            return Err(WorkflowError::validation("file", "file is empty"));
        }
        if self.filename.trim().is_empty() {
            return Err(WorkflowError::validation("filename", "filename is required"));
        }
        if self.mime_type.trim().is_empty() {
            return Err(WorkflowError::validation("mime_type", "mime type is required"));
        }
        if self
            .display_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(WorkflowError::validation("display_name", "display name is blank"));
        }
        Ok(())
    }

    fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

/// A time-limited download link.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SignedUrl {
    pub file_id: i64,
    pub url: String,
    pub expires_in_secs: u64,
}

fn ensure_editable(actor: &Actor, version: &SyllabusVersion) -> Result<(), WorkflowError> {
    if can_edit_file(
        actor.user_id,
        &actor.roles,
        version.workflow_status,
        version.created_by,
    ) {
        return Ok(());
    }
    warn!(
        version_id = version.id,
        actor = actor.user_id,
        status = %version.workflow_status,
        "file mutation denied"
    );
    if version.workflow_status == WorkflowStatus::Draft {
        Err(WorkflowError::Unauthorized)
    } else {
        Err(WorkflowError::Conflict(format!(
            "version {} is {}; files can only change while DRAFT",
            version.id, version.workflow_status
        )))
    }
}

/// A denied view is indistinguishable from a missing file.
fn ensure_viewable(
    actor: &Actor,
    version: &SyllabusVersion,
    missing: impl FnOnce() -> String,
) -> Result<(), WorkflowError> {
    if can_view_file(
        actor.user_id,
        &actor.roles,
        version.workflow_status,
        version.created_by,
    ) {
        Ok(())
    } else {
        debug!(version_id = version.id, actor = actor.user_id, "file view denied");
        Err(WorkflowError::NotFound(missing()))
    }
}

async fn load_version<T: SyllabusRepository>(
    tx: &mut T,
    version_id: i64,
) -> Result<SyllabusVersion, WorkflowError> {
    tx.get_version(version_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("version {version_id}")))
}

async fn load_file<T: FileRepository>(tx: &mut T, file_id: i64) -> Result<FileAsset, WorkflowError> {
    tx.get_file(file_id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("file {file_id}")))
}

/// File operations gated by the access and mutation policies.
pub struct FileService<S, B> {
    store: Arc<S>,
    blobs: Arc<B>,
    config: FileServiceConfig,
}

impl<S: SyllabusStore, B: BlobStore> FileService<S, B> {
    #[must_use]
    pub const fn new(store: Arc<S>, blobs: Arc<B>, config: FileServiceConfig) -> Self {
        Self {
            store,
            blobs,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Attach a document to a draft version.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty or unnamed upload; `NotFound` for an
    /// unknown version; `Conflict` once the version left `DRAFT`;
    /// `Unauthorized` for anyone but the owning lecturer.
    pub async fn upload_file(
        &self,
        actor: &Actor,
        version_id: i64,
        upload: FileUpload,
    ) -> Result<FileAsset, WorkflowError> {
        upload.validate()?;

        let mut tx = self.store.begin().await?;
        let checked: Result<_, WorkflowError> = async {
            let version = load_version(&mut tx, version_id).await?;
            ensure_editable(actor, &version)?;
            Ok(version)
        }
        .await;
        let version = finish(tx, checked, "upload_file.check").await?;

        let path_hint = format!(
            "syllabi/{}/versions/{}/{}",
            version.syllabus_id,
            version.id,
            upload.filename.trim()
        );
        let size_bytes = upload.size();
        let FileUpload {
            bytes,
            filename,
            mime_type,
            display_name,
        } = upload;
        let object_path = self.blobs.upload(bytes, &path_hint, &mime_type).await?;

        let new = NewFileAsset {
            syllabus_version_id: version.id,
            display_name: display_name
                .map_or_else(|| filename.trim().to_string(), |name| name.trim().to_string()),
            original_filename: filename.trim().to_string(),
            bucket: self.blobs.bucket().to_string(),
            object_path: object_path.clone(),
            mime_type,
            size_bytes,
            uploaded_by: actor.user_id,
            created_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;
        let written: Result<_, WorkflowError> = async {
            // Status may have moved while the blob was uploading.
            let version = load_version(&mut tx, version_id).await?;
            ensure_editable(actor, &version)?;
            Ok(tx.add_file(new).await?)
        }
        .await;
        match finish(tx, written, "upload_file").await {
            Ok(file) => {
                info!(
                    file_id = file.id,
                    version_id,
                    actor = actor.user_id,
                    path = %file.object_path,
                    "file uploaded"
                );
                Ok(file)
            }
            Err(err) => {
                self.compensate(&object_path).await;
                Err(err)
            }
        }
    }

    /// Swap the content of an existing file, keeping its id.
    ///
    /// # Errors
    ///
    /// As [`Self::upload_file`], with `NotFound` for an unknown file.
    pub async fn replace_file(
        &self,
        actor: &Actor,
        file_id: i64,
        upload: FileUpload,
    ) -> Result<FileAsset, WorkflowError> {
        upload.validate()?;

        let mut tx = self.store.begin().await?;
        let checked: Result<_, WorkflowError> = async {
            let file = load_file(&mut tx, file_id).await?;
            let version = load_version(&mut tx, file.syllabus_version_id).await?;
            ensure_editable(actor, &version)?;
            Ok(version)
        }
        .await;
        let version = finish(tx, checked, "replace_file.check").await?;

        let path_hint = format!(
            "syllabi/{}/versions/{}/{}",
            version.syllabus_id,
            version.id,
            upload.filename.trim()
        );
        let size_bytes = upload.size();
        let FileUpload {
            bytes,
            filename,
            mime_type,
            display_name,
        } = upload;
        let new_path = self.blobs.upload(bytes, &path_hint, &mime_type).await?;

        let mut tx = self.store.begin().await?;
        let written: Result<_, WorkflowError> = async {
            let mut file = load_file(&mut tx, file_id).await?;
            let version = load_version(&mut tx, file.syllabus_version_id).await?;
            ensure_editable(actor, &version)?;
            let old_path = std::mem::replace(&mut file.object_path, new_path.clone());
            file.original_filename = filename.trim().to_string();
            file.mime_type = mime_type;
            file.size_bytes = size_bytes;
            if let Some(name) = display_name {
                file.display_name = name.trim().to_string();
            }
            tx.update_file(&file).await?;
            Ok((file, old_path))
        }
        .await;

        match finish(tx, written, "replace_file").await {
            Ok((file, old_path)) => {
                info!(file_id, actor = actor.user_id, path = %file.object_path, "file replaced");
                self.delete_best_effort("replace_file", &old_path).await;
                Ok(file)
            }
            Err(err) => {
                self.compensate(&new_path).await;
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// `Validation` for a blank name; otherwise as [`Self::delete_file`].
    pub async fn rename_file(
        &self,
        actor: &Actor,
        file_id: i64,
        display_name: &str,
    ) -> Result<FileAsset, WorkflowError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(WorkflowError::validation("display_name", "display name is blank"));
        }

        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let mut file = load_file(&mut tx, file_id).await?;
            let version = load_version(&mut tx, file.syllabus_version_id).await?;
            ensure_editable(actor, &version)?;
            file.display_name = display_name.to_string();
            tx.update_file(&file).await?;
            Ok(file)
        }
        .await;
        let file = finish(tx, result, "rename_file").await?;
        info!(file_id, actor = actor.user_id, "file renamed");
        Ok(file)
    }

    /// Remove the row, then the blob. A blob that cannot be removed is logged.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown file; `Conflict` or `Unauthorized` as for
    /// every other mutation.
    pub async fn delete_file(&self, actor: &Actor, file_id: i64) -> Result<FileAsset, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let file = load_file(&mut tx, file_id).await?;
            let version = load_version(&mut tx, file.syllabus_version_id).await?;
            ensure_editable(actor, &version)?;
            if !tx.delete_file(file_id).await? {
                return Err(WorkflowError::NotFound(format!("file {file_id}")));
            }
            Ok(file)
        }
        .await;
        let file = finish(tx, result, "delete_file").await?;
        info!(file_id, actor = actor.user_id, "file deleted");
        self.delete_best_effort("delete_file", &file.object_path).await;
        Ok(file)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// `NotFound` for an unknown file or one the actor may not view.
    pub async fn get_file_metadata(&self, actor: &Actor, file_id: i64) -> Result<FileAsset, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = Self::viewable_file(&mut tx, actor, file_id).await;
        finish(tx, result, "get_file_metadata").await
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown version or one the actor may not view.
    pub async fn list_files_by_version(
        &self,
        actor: &Actor,
        version_id: i64,
    ) -> Result<Vec<FileAsset>, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let version = load_version(&mut tx, version_id).await?;
            ensure_viewable(actor, &version, || format!("version {version_id}"))?;
            Ok(tx.list_files(version_id).await?)
        }
        .await;
        finish(tx, result, "list_files_by_version").await
    }

    /// Download link valid for `ttl`.
    ///
    /// # Errors
    ///
    /// `Validation` unless `1s <= ttl <= max_url_ttl`; `NotFound` for an
    /// unknown or hidden file.
    pub async fn signed_url(
        &self,
        actor: &Actor,
        file_id: i64,
        ttl: Duration,
    ) -> Result<SignedUrl, WorkflowError> {
        if ttl < MIN_URL_TTL || ttl > self.config.max_url_ttl {
            return Err(WorkflowError::validation(
                "ttl",
                format!(
                    "must be between 1 and {} seconds",
                    self.config.max_url_ttl.as_secs()
                ),
            ));
        }

        let mut tx = self.store.begin().await?;
        let result = Self::viewable_file(&mut tx, actor, file_id).await;
        let file = finish(tx, result, "signed_url").await?;

        let url = self.blobs.signed_url(&file.object_path, ttl).await?;
        Ok(SignedUrl {
            file_id,
            url,
            expires_in_secs: ttl.as_secs(),
        })
    }

    async fn viewable_file(
        tx: &mut S::Tx,
        actor: &Actor,
        file_id: i64,
    ) -> Result<FileAsset, WorkflowError> {
        let file = load_file(tx, file_id).await?;
        let version = load_version(tx, file.syllabus_version_id).await?;
        ensure_viewable(actor, &version, || format!("file {file_id}"))?;
        Ok(file)
    }

    // -----------------------------------------------------------------------
    // Blob cleanup
    // -----------------------------------------------------------------------

    /// Delete a blob whose metadata never committed. Returns whether it is gone.
    async fn compensate(&self, path: &str) -> bool {
        let policy = self.config.cleanup;
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.blobs.delete(path).await {
                Ok(_) => {
                    debug!(path, attempt, "compensating delete succeeded");
                    return true;
                }
                Err(err) => {
                    warn!(path, attempt, error = %err, "compensating delete failed");
                    if attempt < attempts {
                        tokio::time::sleep(policy.delay_after(attempt)).await;
                    }
                }
            }
        }
        error!(
            bucket = self.blobs.bucket(),
            path,
            attempts,
            "orphaned object: cleanup failed after metadata write failure"
        );
        false
    }

    /// Drop a blob whose row no longer points at it. The row change has
    /// already committed, so a failure only leaves an orphan behind.
    async fn delete_best_effort(&self, op: &'static str, path: &str) {
        match self.blobs.delete(path).await {
            Ok(true) => {}
            Ok(false) => debug!(op, path, "object already gone"),
            Err(err) => error!(
                op,
                bucket = self.blobs.bucket(),
                path,
                error = %err,
                "orphaned object: blob delete failed after {op} committed"
            ),
        }
    }
}
