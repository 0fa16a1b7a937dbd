use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user following updates to a published syllabus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub syllabus_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Reader feedback left on the current version of a published syllabus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Feedback {
    pub id: i64,
    pub syllabus_id: i64,
    pub version_id: i64,
    pub author_user_id: i64,
    /// 1 to 5 when given.
    pub rating: Option<u8>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub syllabus_id: i64,
    pub version_id: i64,
    pub author_user_id: i64,
    pub rating: Option<u8>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
