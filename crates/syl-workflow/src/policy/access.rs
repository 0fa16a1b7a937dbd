use syl_core::enums::{Role, WorkflowStatus};
use tracing::warn;

/// Whether a single role lets `user_id` view files of a version.
const fn role_allows_view(
    role: Role,
    user_id: i64,
    status: WorkflowStatus,
    owner_id: i64,
) -> bool {
    match role {
        Role::Admin => true,
        Role::Lecturer => user_id == owner_id || matches!(status, WorkflowStatus::Published),
        Role::Hod => status.is_at_least(WorkflowStatus::PendingReview),
        Role::Aa => status.is_at_least(WorkflowStatus::PendingApproval),
        Role::Principal => status.is_at_least(WorkflowStatus::Approved),
        Role::Student => matches!(status, WorkflowStatus::Published),
    }
}

/// Visibility of a version's files. Passes if any held role passes.
///
/// Reviewers see a version once it has reached their stage and keep seeing
/// it afterwards; students and other lecturers only see published work.
#[must_use]
pub fn can_view_file(
    user_id: i64,
    roles: &[Role],
    version_status: WorkflowStatus,
    version_owner_id: i64,
) -> bool {
    if roles.is_empty() {
        warn!(user_id, "file view check for user without roles");
        return false;
    }
    roles
        .iter()
        .any(|role| role_allows_view(*role, user_id, version_status, version_owner_id))
}
