//! Persistence seam for the workflow engine.
//!
//! Repositories are grouped by aggregate and all implemented by one
//! transaction type, so an engine operation holds a single
//! [`StoreTransaction`] and every read and write it performs is atomic.
//! Repository methods never commit; the engine decides.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{
    Feedback, FileAsset, NewFeedback, NewFileAsset, NewSyllabus, NewWorkflowAction, Program,
    Subject, Subscription, Syllabus, SyllabusVersion, User, WorkflowAction,
};
use crate::enums::{Role, WorkflowStatus};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Busy, locked, or disconnected backend. Safe to retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be interpreted (unknown status, bad timestamp).
    #[error("Invalid stored state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// Users, roles, subjects, and programs.
#[allow(async_fn_in_trait)]
pub trait DirectoryRepository {
    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, RepositoryError>;

    /// Roles currently granted to `user_id`. Empty for unknown users.
    async fn user_roles(&mut self, user_id: i64) -> Result<Vec<Role>, RepositoryError>;

    async fn user_exists(&mut self, user_id: i64) -> Result<bool, RepositoryError>;

    async fn subject_exists(&mut self, subject_id: i64) -> Result<bool, RepositoryError>;

    async fn program_exists(&mut self, program_id: i64) -> Result<bool, RepositoryError>;

    async fn get_subject(&mut self, subject_id: i64) -> Result<Option<Subject>, RepositoryError>;

    async fn get_program(&mut self, program_id: i64) -> Result<Option<Program>, RepositoryError>;
}

#[allow(async_fn_in_trait)]
pub trait SyllabusRepository {
    async fn get_syllabus(&mut self, id: i64) -> Result<Option<Syllabus>, RepositoryError>;

    /// Insert a syllabus in `DRAFT` with no current version.
    async fn add_syllabus(&mut self, new: NewSyllabus) -> Result<Syllabus, RepositoryError>;

    /// Persist subject, program, and current version of `syllabus`.
    ///
    /// Status is written only through [`transition_status`](Self::transition_status).
    async fn update_syllabus(&mut self, syllabus: &Syllabus) -> Result<(), RepositoryError>;

    /// Insert version 1 of `syllabus_id` in `DRAFT`.
    async fn create_initial_version(
        &mut self,
        syllabus_id: i64,
        created_by: i64,
        created_at: DateTime<Utc>,
    ) -> Result<SyllabusVersion, RepositoryError>;

    async fn get_version(&mut self, id: i64) -> Result<Option<SyllabusVersion>, RepositoryError>;

    /// Persist status and lifecycle timestamps of `version`.
    async fn update_version(&mut self, version: &SyllabusVersion) -> Result<(), RepositoryError>;

    /// Move `syllabus_id` from `expected` to `next` only if it is still in
    /// `expected`. Returns `false` when no row matched.
    async fn transition_status(
        &mut self,
        syllabus_id: i64,
        expected: WorkflowStatus,
        next: WorkflowStatus,
    ) -> Result<bool, RepositoryError>;

    async fn list_by_status(
        &mut self,
        status: WorkflowStatus,
    ) -> Result<Vec<Syllabus>, RepositoryError>;

    async fn list_by_owner(&mut self, owner_id: i64) -> Result<Vec<Syllabus>, RepositoryError>;

    async fn append_action(
        &mut self,
        action: NewWorkflowAction,
    ) -> Result<WorkflowAction, RepositoryError>;

    /// Audit rows for a version, oldest first.
    async fn list_actions(&mut self, version_id: i64)
    -> Result<Vec<WorkflowAction>, RepositoryError>;
}

#[allow(async_fn_in_trait)]
pub trait FileRepository {
    async fn add_file(&mut self, new: NewFileAsset) -> Result<FileAsset, RepositoryError>;

    async fn get_file(&mut self, id: i64) -> Result<Option<FileAsset>, RepositoryError>;

    async fn list_files(&mut self, version_id: i64) -> Result<Vec<FileAsset>, RepositoryError>;

    /// Persist the mutable fields: filenames, object path, mime type, size.
    async fn update_file(&mut self, file: &FileAsset) -> Result<(), RepositoryError>;

    /// Returns `false` if no row was deleted.
    async fn delete_file(&mut self, id: i64) -> Result<bool, RepositoryError>;
}

#[allow(async_fn_in_trait)]
pub trait EngagementRepository {
    async fn find_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
    ) -> Result<Option<Subscription>, RepositoryError>;

    async fn add_subscription(
        &mut self,
        user_id: i64,
        syllabus_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Subscription, RepositoryError>;

    async fn add_feedback(&mut self, new: NewFeedback) -> Result<Feedback, RepositoryError>;

    async fn list_feedback(&mut self, syllabus_id: i64) -> Result<Vec<Feedback>, RepositoryError>;
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// One unit of work over every repository.
///
/// Dropping a transaction without committing discards its writes.
#[allow(async_fn_in_trait)]
pub trait StoreTransaction:
    DirectoryRepository + SyllabusRepository + FileRepository + EngagementRepository
{
    async fn commit(self) -> Result<(), RepositoryError>;

    async fn rollback(self) -> Result<(), RepositoryError>;
}

/// A store that hands out transactions.
///
/// Implementations serialize transactions: while one is open, `begin`
/// waits.
#[allow(async_fn_in_trait)]
pub trait SyllabusStore {
    type Tx: StoreTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;
}
