use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// The authenticated user performing an operation.
///
/// Passed explicitly to every engine and policy call. Roles are resolved
/// per request from the user↔role table and trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    pub user_id: i64,
    pub roles: Vec<Role>,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: i64, roles: impl Into<Vec<Role>>) -> Self {
        Self {
            user_id,
            roles: roles.into(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
