//! The syllabus workflow state machine.
//!
//! Every write follows the same protocol inside one store transaction:
//! 1. Load the syllabus and check it is in the rule's `from` state
//! 2. Check the actor holds an allowed role (and owns it, for submit)
//! 3. Conditionally update the status (`WHERE lifecycle_status = from`)
//! 4. Mirror status and timestamps onto the current version
//! 5. Append the audit row
//! 6. Commit; any error rolls everything back

use std::sync::Arc;

use chrono::Utc;
use syl_core::entities::{
    DraftUpdate, NewSyllabus, NewWorkflowAction, Syllabus, SyllabusDetail, SyllabusVersion,
    WorkflowAction,
};
use syl_core::enums::{Role, WorkflowActionType, WorkflowStatus};
use syl_core::identity::Actor;
use syl_core::repository::{DirectoryRepository, SyllabusRepository, SyllabusStore};
use syl_core::transitions::{self, TransitionRule};
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::txn::finish;

/// Workflow operations over a [`SyllabusStore`].
pub struct SyllabusWorkflow<S> {
    store: Arc<S>,
}

impl<S> Clone for SyllabusWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Load a syllabus or fail with `NotFound`.
pub(crate) async fn load_syllabus<T: SyllabusRepository>(
    tx: &mut T,
    id: i64,
) -> Result<Syllabus, WorkflowError> {
    tx.get_syllabus(id)
        .await?
        .ok_or_else(|| WorkflowError::NotFound(format!("syllabus {id}")))
}

/// The current version of `syllabus`. A syllabus without one is corrupt.
pub(crate) async fn load_current_version<T: SyllabusRepository>(
    tx: &mut T,
    syllabus: &Syllabus,
) -> Result<SyllabusVersion, WorkflowError> {
    let version_id = syllabus.current_version_id.ok_or_else(|| {
        WorkflowError::Internal(format!("syllabus {} has no current version", syllabus.id))
    })?;
    tx.get_version(version_id).await?.ok_or_else(|| {
        WorkflowError::Internal(format!(
            "syllabus {} points at missing version {version_id}",
            syllabus.id
        ))
    })
}

fn require_reason(reason: &str) -> Result<String, WorkflowError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::validation(
            "reason",
            "a rejection reason is required",
        ));
    }
    Ok(trimmed.to_string())
}

impl<S: SyllabusStore> SyllabusWorkflow<S> {
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Drafting
    // -----------------------------------------------------------------------

    /// Create a syllabus in `DRAFT` together with its first version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown subject, program, or owner; `Unauthorized`
    /// if the owner does not hold `LECTURER`.
    pub async fn create_draft(
        &self,
        subject_id: i64,
        program_id: i64,
        owner_lecturer_id: i64,
    ) -> Result<SyllabusDetail, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = Self::create_draft_in(&mut tx, subject_id, program_id, owner_lecturer_id).await;
        let detail = finish(tx, result, "create_draft").await?;
        info!(
            syllabus_id = detail.syllabus.id,
            version_id = detail.version.id,
            owner = owner_lecturer_id,
            "draft created"
        );
        Ok(detail)
    }

    async fn create_draft_in(
        tx: &mut S::Tx,
        subject_id: i64,
        program_id: i64,
        owner_lecturer_id: i64,
    ) -> Result<SyllabusDetail, WorkflowError> {
        if !tx.subject_exists(subject_id).await? {
            return Err(WorkflowError::NotFound(format!("subject {subject_id}")));
        }
        if !tx.program_exists(program_id).await? {
            return Err(WorkflowError::NotFound(format!("program {program_id}")));
        }
        if !tx.user_exists(owner_lecturer_id).await? {
            return Err(WorkflowError::NotFound(format!("user {owner_lecturer_id}")));
        }
        if !tx.user_roles(owner_lecturer_id).await?.contains(&Role::Lecturer) {
            warn!(owner = owner_lecturer_id, "draft owner is not a lecturer");
            return Err(WorkflowError::Unauthorized);
        }

        let now = Utc::now();
        let mut syllabus = tx
            .add_syllabus(NewSyllabus {
                subject_id,
                program_id,
                owner_lecturer_id,
                created_at: now,
            })
            .await?;
        let version = tx
            .create_initial_version(syllabus.id, owner_lecturer_id, now)
            .await?;
        syllabus.current_version_id = Some(version.id);
        tx.update_syllabus(&syllabus).await?;
        Ok(SyllabusDetail { syllabus, version })
    }

    /// Change subject or program of a draft. The owner never changes.
    ///
    /// When `owner_id` is given it must match the stored owner.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown syllabus, subject, or program; `Conflict`
    /// unless the syllabus is `DRAFT`; `Unauthorized` on owner mismatch.
    pub async fn update_draft(
        &self,
        id: i64,
        owner_id: Option<i64>,
        update: DraftUpdate,
    ) -> Result<Syllabus, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = Self::update_draft_in(&mut tx, id, owner_id, update).await;
        finish(tx, result, "update_draft").await
    }

    async fn update_draft_in(
        tx: &mut S::Tx,
        id: i64,
        owner_id: Option<i64>,
        update: DraftUpdate,
    ) -> Result<Syllabus, WorkflowError> {
        let mut syllabus = load_syllabus(tx, id).await?;
        if syllabus.lifecycle_status != WorkflowStatus::Draft {
            return Err(WorkflowError::Conflict(format!(
                "syllabus {id} is {} and can no longer be edited",
                syllabus.lifecycle_status
            )));
        }
        if owner_id.is_some_and(|owner| owner != syllabus.owner_lecturer_id) {
            warn!(syllabus_id = id, "draft update by non-owner");
            return Err(WorkflowError::Unauthorized);
        }
        if let Some(subject_id) = update.subject_id {
            if !tx.subject_exists(subject_id).await? {
                return Err(WorkflowError::NotFound(format!("subject {subject_id}")));
            }
            syllabus.subject_id = subject_id;
        }
        if let Some(program_id) = update.program_id {
            if !tx.program_exists(program_id).await? {
                return Err(WorkflowError::NotFound(format!("program {program_id}")));
            }
            syllabus.program_id = program_id;
        }
        if !update.is_empty() {
            tx.update_syllabus(&syllabus).await?;
        }
        Ok(syllabus)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// `DRAFT → PENDING_REVIEW`, by the owning lecturer.
    ///
    /// # Errors
    ///
    /// `Conflict` unless `DRAFT` (whatever the actor's role); `Unauthorized`
    /// unless the actor owns the syllabus and holds `LECTURER`.
    pub async fn submit_for_review(
        &self,
        id: i64,
        actor: &Actor,
    ) -> Result<SyllabusDetail, WorkflowError> {
        self.transition(id, actor, WorkflowActionType::Submit, None)
            .await
    }

    /// `PENDING_REVIEW → PENDING_APPROVAL`, by a head of department.
    ///
    /// # Errors
    ///
    /// `Conflict` unless `PENDING_REVIEW`; `Unauthorized` without `HOD`.
    pub async fn hod_approve(&self, id: i64, actor: &Actor) -> Result<SyllabusDetail, WorkflowError> {
        self.transition(id, actor, WorkflowActionType::HodApprove, None)
            .await
    }

    /// `PENDING_REVIEW → DRAFT` with a mandatory reason.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank reason (checked first); otherwise as
    /// [`Self::hod_approve`].
    pub async fn hod_reject(
        &self,
        id: i64,
        actor: &Actor,
        reason: &str,
    ) -> Result<SyllabusDetail, WorkflowError> {
        let reason = require_reason(reason)?;
        self.transition(id, actor, WorkflowActionType::HodReject, Some(reason))
            .await
    }

    /// `PENDING_APPROVAL → APPROVED`, by academic affairs.
    ///
    /// # Errors
    ///
    /// `Conflict` unless `PENDING_APPROVAL`; `Unauthorized` without `AA`.
    pub async fn aa_approve(&self, id: i64, actor: &Actor) -> Result<SyllabusDetail, WorkflowError> {
        self.transition(id, actor, WorkflowActionType::AaApprove, None)
            .await
    }

    /// `PENDING_APPROVAL → PENDING_REVIEW` with a mandatory reason.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank reason; otherwise as [`Self::aa_approve`].
    pub async fn aa_reject(
        &self,
        id: i64,
        actor: &Actor,
        reason: &str,
    ) -> Result<SyllabusDetail, WorkflowError> {
        let reason = require_reason(reason)?;
        self.transition(id, actor, WorkflowActionType::AaReject, Some(reason))
            .await
    }

    /// `APPROVED → PUBLISHED`, by an admin or principal.
    ///
    /// # Errors
    ///
    /// `Conflict` unless `APPROVED`; `Unauthorized` without `ADMIN`/`PRINCIPAL`.
    pub async fn publish(&self, id: i64, actor: &Actor) -> Result<SyllabusDetail, WorkflowError> {
        self.transition(id, actor, WorkflowActionType::Publish, None)
            .await
    }

    /// `PUBLISHED → APPROVED`, by an admin or principal.
    ///
    /// # Errors
    ///
    /// `Conflict` unless `PUBLISHED`; `Unauthorized` without `ADMIN`/`PRINCIPAL`.
    pub async fn unpublish(&self, id: i64, actor: &Actor) -> Result<SyllabusDetail, WorkflowError> {
        self.transition(id, actor, WorkflowActionType::Unpublish, None)
            .await
    }

    async fn transition(
        &self,
        id: i64,
        actor: &Actor,
        action: WorkflowActionType,
        note: Option<String>,
    ) -> Result<SyllabusDetail, WorkflowError> {
        let rule = transitions::for_action(action);
        let mut tx = self.store.begin().await?;
        let result = Self::transition_in(&mut tx, id, actor, rule, note).await;
        let detail = finish(tx, result, action.as_str()).await?;
        info!(
            syllabus_id = id,
            from = %rule.from,
            to = %rule.to,
            actor = actor.user_id,
            action = %action,
            "syllabus transitioned"
        );
        Ok(detail)
    }

    async fn transition_in(
        tx: &mut S::Tx,
        id: i64,
        actor: &Actor,
        rule: &'static TransitionRule,
        note: Option<String>,
    ) -> Result<SyllabusDetail, WorkflowError> {
        let mut syllabus = load_syllabus(tx, id).await?;
        let from = syllabus.lifecycle_status;
        if from != rule.from {
            return Err(WorkflowError::Conflict(format!(
                "syllabus {id} is {from}; {} requires {}",
                rule.action, rule.from
            )));
        }

        let Some(role) = transitions::authorizing_role(rule.from, rule.to, &actor.roles) else {
            warn!(syllabus_id = id, actor = actor.user_id, action = %rule.action, "transition denied: role");
            return Err(WorkflowError::Unauthorized);
        };
        if rule.action == WorkflowActionType::Submit && actor.user_id != syllabus.owner_lecturer_id {
            warn!(syllabus_id = id, actor = actor.user_id, action = %rule.action, "transition denied: owner");
            return Err(WorkflowError::Unauthorized);
        }

        if !tx.transition_status(id, rule.from, rule.to).await? {
            return Err(WorkflowError::Conflict(format!(
                "syllabus {id} changed while {} was in progress",
                rule.action
            )));
        }
        syllabus.lifecycle_status = rule.to;

        let now = Utc::now();
        let mut version = load_current_version(tx, &syllabus).await?;
        version.apply_transition(rule.to, rule.effect, now);
        tx.update_version(&version).await?;

        tx.append_action(NewWorkflowAction {
            version_id: version.id,
            actor_user_id: actor.user_id,
            action_type: rule.action,
            from_status: rule.from,
            to_status: rule.to,
            note,
            acted_at: now,
        })
        .await?;

        tracing::debug!(syllabus_id = id, role = %role, "transition authorized");
        Ok(SyllabusDetail { syllabus, version })
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn get(&self, id: i64) -> Result<Syllabus, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = load_syllabus(&mut tx, id).await;
        finish(tx, result, "get").await
    }

    /// Syllabus plus its current version.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn get_detail(&self, id: i64) -> Result<SyllabusDetail, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let syllabus = load_syllabus(&mut tx, id).await?;
            let version = load_current_version(&mut tx, &syllabus).await?;
            Ok(SyllabusDetail { syllabus, version })
        }
        .await;
        finish(tx, result, "get_detail").await
    }

    /// # Errors
    ///
    /// Only infrastructure failures.
    pub async fn list_by_status(&self, status: WorkflowStatus) -> Result<Vec<Syllabus>, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_by_status(status).await.map_err(WorkflowError::from);
        finish(tx, result, "list_by_status").await
    }

    /// # Errors
    ///
    /// Only infrastructure failures.
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Syllabus>, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_by_owner(owner_id).await.map_err(WorkflowError::from);
        finish(tx, result, "list_by_owner").await
    }

    /// Audit trail of the current version, oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn history(&self, id: i64) -> Result<Vec<WorkflowAction>, WorkflowError> {
        let mut tx = self.store.begin().await?;
        let result: Result<_, WorkflowError> = async {
            let syllabus = load_syllabus(&mut tx, id).await?;
            let version = load_current_version(&mut tx, &syllabus).await?;
            Ok(tx.list_actions(version.id).await?)
        }
        .await;
        finish(tx, result, "history").await
    }
}
