use chrono::{DateTime, Datelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WorkflowStatus;
use crate::transitions::TimestampEffect;

/// The active version of a syllabus. Only version 1 exists in this core.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyllabusVersion {
    pub id: i64,
    pub syllabus_id: i64,
    pub academic_year: String,
    pub version_no: u32,
    pub workflow_status: WorkflowStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl SyllabusVersion {
    /// Academic year label for a version created at `at`, e.g. `"2026-2027"`.
    #[must_use]
    pub fn academic_year_for(at: DateTime<Utc>) -> String {
        let year = at.year();
        format!("{year}-{}", year + 1)
    }

    /// Mirror a transition into this version: new status plus timestamp effect.
    pub fn apply_transition(
        &mut self,
        to: WorkflowStatus,
        effect: TimestampEffect,
        at: DateTime<Utc>,
    ) {
        self.workflow_status = to;
        match effect {
            TimestampEffect::None => {}
            TimestampEffect::StampSubmitted => self.submitted_at = Some(at),
            TimestampEffect::StampApproved => self.approved_at = Some(at),
            TimestampEffect::ClearApproved => self.approved_at = None,
            TimestampEffect::StampPublished => self.published_at = Some(at),
            TimestampEffect::ClearPublished => self.published_at = None,
        }
    }
}
