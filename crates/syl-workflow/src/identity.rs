//! Resolving an authenticated user id into an [`Actor`].

use syl_core::identity::Actor;
use syl_core::repository::{DirectoryRepository, SyllabusStore};
use tracing::warn;

use crate::error::WorkflowError;
use crate::txn::finish;

/// Read `user_id`'s current roles. Never cached: a revoked role takes
/// effect on the next request.
///
/// # Errors
///
/// `Unauthorized` for an unknown or inactive user.
pub async fn resolve_actor<S: SyllabusStore>(store: &S, user_id: i64) -> Result<Actor, WorkflowError> {
    let mut tx = store.begin().await?;
    let result: Result<_, WorkflowError> = async {
        match tx.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(Actor::new(user.id, user.roles)),
            Some(_) => {
                warn!(user_id, "inactive user attempted to act");
                Err(WorkflowError::Unauthorized)
            }
            None => {
                warn!(user_id, "unknown user attempted to act");
                Err(WorkflowError::Unauthorized)
            }
        }
    }
    .await;
    finish(tx, result, "resolve_actor").await
}
