//! Public-facing reads and reader engagement on published syllabi.

use std::sync::Arc;

use chrono::Utc;
use syl_core::entities::{Feedback, NewFeedback, Subscription, Syllabus, SyllabusDetail};
use syl_core::enums::WorkflowStatus;
use syl_core::repository::{
    DirectoryRepository, EngagementRepository, SyllabusRepository, SyllabusStore,
};
use tracing::info;

use crate::engine::{load_current_version, load_syllabus};
use crate::error::WorkflowError;
use crate::txn::finish;

const MAX_FEEDBACK_LEN: usize = 5000;

fn ensure_published(syllabus: &Syllabus) -> Result<(), WorkflowError> {
    if syllabus.lifecycle_status == WorkflowStatus::Published {
        Ok(())
    } else {
        Err(WorkflowError::Conflict(format!(
            "syllabus {} is not published",
            syllabus.id
        )))
    }
}

async fn ensure_user<T: DirectoryRepository>(tx: &mut T, user_id: i64) -> Result<(), WorkflowError> {
    if tx.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(WorkflowError::NotFound(format!("user {user_id}")))
    }
}

/// Case-insensitive match on subject or program code and name, or an exact
/// syllabus id.
async fn matches_query<T: DirectoryRepository>(
    tx: &mut T,
    syllabus: &Syllabus,
    needle: &str,
) -> Result<bool, WorkflowError> {
    if syllabus.id.to_string() == needle {
        return Ok(true);
    }
    let mut haystacks = Vec::with_capacity(4);
    if let Some(subject) = tx.get_subject(syllabus.subject_id).await? {
        haystacks.extend([subject.code, subject.name]);
    }
    if let Some(program) = tx.get_program(syllabus.program_id).await? {
        haystacks.extend([program.code, program.name]);
    }
    Ok(haystacks
        .iter()
        .any(|hay| hay.to_lowercase().contains(needle)))
}

pub struct Engagement<S> {
    store: Arc<S>,
}

impl<S: SyllabusStore> Engagement<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Published syllabi, narrowed by `query` when it is not blank.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures.
    pub async fn list_published(&self, query: Option<&str>) -> Result<Vec<Syllabus>, WorkflowError> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let published = tx.list_by_status(WorkflowStatus::Published).await?;
            let Some(needle) = needle else {
                return Ok(published);
            };
            let mut matched = Vec::new();
            for syllabus in published {
                if matches_query(&mut tx, &syllabus, &needle).await? {
                    matched.push(syllabus);
                }
            }
            Ok(matched)
        }
        .await;
        finish(tx, result, "list_published").await
    }

    /// A published syllabus with its current version. Anything not
    /// published reads as missing.
    ///
    /// # Errors
    ///
    /// `NotFound` unless the syllabus exists and is `PUBLISHED`.
    pub async fn get_published(&self, syllabus_id: i64) -> Result<SyllabusDetail, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let syllabus = load_syllabus(&mut tx, syllabus_id).await?;
            if syllabus.lifecycle_status != WorkflowStatus::Published {
                return Err(WorkflowError::NotFound(format!(
                    "published syllabus {syllabus_id}"
                )));
            }
            let version = load_current_version(&mut tx, &syllabus).await?;
            Ok(SyllabusDetail { syllabus, version })
        }
        .await;
        finish(tx, result, "get_published").await
    }

    /// Follow a published syllabus.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown syllabus or user; `Conflict` if it is not
    /// published or the user already subscribed.
    pub async fn subscribe(&self, syllabus_id: i64, user_id: i64) -> Result<Subscription, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let syllabus = load_syllabus(&mut tx, syllabus_id).await?;
            ensure_user(&mut tx, user_id).await?;
            ensure_published(&syllabus)?;
            if tx.find_subscription(user_id, syllabus_id).await?.is_some() {
                return Err(WorkflowError::Conflict(format!(
                    "user {user_id} is already subscribed to syllabus {syllabus_id}"
                )));
            }
            Ok(tx.add_subscription(user_id, syllabus_id, Utc::now()).await?)
        }
        .await;
        let subscription = finish(tx, result, "subscribe").await?;
        info!(syllabus_id, user_id, "subscribed");
        Ok(subscription)
    }

    /// Leave feedback on the current version of a published syllabus.
    ///
    /// # Errors
    ///
    /// `Validation` for blank or oversized content or a rating outside
    /// 1..=5 (checked first); `NotFound`; `Conflict` unless published.
    pub async fn submit_feedback(
        &self,
        syllabus_id: i64,
        user_id: i64,
        content: &str,
        rating: Option<u8>,
    ) -> Result<Feedback, WorkflowError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(WorkflowError::validation("content", "feedback content is required"));
        }
        if content.chars().count() > MAX_FEEDBACK_LEN {
            return Err(WorkflowError::validation(
                "content",
                format!("feedback is limited to {MAX_FEEDBACK_LEN} characters"),
            ));
        }
        if rating.is_some_and(|r| !(1..=5).contains(&r)) {
            return Err(WorkflowError::validation("rating", "rating must be between 1 and 5"));
        }

        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let syllabus = load_syllabus(&mut tx, syllabus_id).await?;
            ensure_user(&mut tx, user_id).await?;
            ensure_published(&syllabus)?;
            let version = load_current_version(&mut tx, &syllabus).await?;
            Ok(tx
                .add_feedback(NewFeedback {
                    syllabus_id,
                    version_id: version.id,
                    author_user_id: user_id,
                    rating,
                    content: content.to_string(),
                    created_at: Utc::now(),
                })
                .await?)
        }
        .await;
        let feedback = finish(tx, result, "submit_feedback").await?;
        info!(syllabus_id, user_id, feedback_id = feedback.id, "feedback recorded");
        Ok(feedback)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown syllabus.
    pub async fn list_feedback(&self, syllabus_id: i64) -> Result<Vec<Feedback>, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            load_syllabus(&mut tx, syllabus_id).await?;
            Ok(tx.list_feedback(syllabus_id).await?)
        }
        .await;
        finish(tx, result, "list_feedback").await
    }
}
