use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{WorkflowActionType, WorkflowStatus};

/// Append-only audit record of one state-changing operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WorkflowAction {
    pub id: i64,
    pub version_id: i64,
    pub actor_user_id: i64,
    pub action_type: WorkflowActionType,
    pub from_status: WorkflowStatus,
    pub to_status: WorkflowStatus,
    pub note: Option<String>,
    pub acted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkflowAction {
    pub version_id: i64,
    pub actor_user_id: i64,
    pub action_type: WorkflowActionType,
    pub from_status: WorkflowStatus,
    pub to_status: WorkflowStatus,
    pub note: Option<String>,
    pub acted_at: DateTime<Utc>,
}
