use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::version::SyllabusVersion;
use crate::enums::WorkflowStatus;

/// One syllabus offering for a (subject, program, owner) triple.
///
/// `lifecycle_status` always mirrors the current version's `workflow_status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Syllabus {
    pub id: i64,
    pub subject_id: i64,
    pub program_id: i64,
    pub owner_lecturer_id: i64,
    pub current_version_id: Option<i64>,
    pub lifecycle_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSyllabus {
    pub subject_id: i64,
    pub program_id: i64,
    pub owner_lecturer_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Mutable fields of a draft. The owner is fixed at creation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DraftUpdate {
    pub subject_id: Option<i64>,
    pub program_id: Option<i64>,
}

impl DraftUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.subject_id.is_none() && self.program_id.is_none()
    }
}

/// A syllabus together with its current version.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyllabusDetail {
    pub syllabus: Syllabus,
    pub version: SyllabusVersion,
}
