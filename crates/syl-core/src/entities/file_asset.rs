use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata for an uploaded document bound to one syllabus version.
///
/// Carries no permission state of its own: access is decided from the
/// parent version's owner and workflow status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FileAsset {
    pub id: i64,
    pub syllabus_version_id: i64,
    pub original_filename: String,
    pub display_name: String,
    pub bucket: String,
    pub object_path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFileAsset {
    pub syllabus_version_id: i64,
    pub original_filename: String,
    pub display_name: String,
    pub bucket: String,
    pub object_path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}
