use syl_core::enums::{Role, WorkflowStatus};

/// Upload, replace, rename, and delete are allowed only to the owning
/// lecturer while the version is still a draft.
#[must_use]
pub fn can_edit_file(
    user_id: i64,
    roles: &[Role],
    version_status: WorkflowStatus,
    version_owner_id: i64,
) -> bool {
    roles.contains(&Role::Lecturer)
        && user_id == version_owner_id
        && version_status == WorkflowStatus::Draft
}
