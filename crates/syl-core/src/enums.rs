//! Status, role, and action enums for the syllabus workflow.
//!
//! All enums serialize as `SCREAMING_SNAKE_CASE`, which is also the form
//! stored in SQL. `WorkflowStatus` carries the total order used by the file
//! access policy and exposes `allowed_next_states()` derived from the
//! transition table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;
use crate::transitions;

// ---------------------------------------------------------------------------
// WorkflowStatus
// ---------------------------------------------------------------------------

/// Lifecycle stage of a syllabus and its current version.
///
/// ```text
/// draft → pending_review → pending_approval → approved → published
///   ↑           │  ↑               │              ↑          │
///   └───────────┘  └───────────────┘              └──────────┘
///    (hod reject)      (aa reject)                (unpublish)
/// ```
///
/// The variants are declared in rank order, so the derived `Ord` matches
/// [`WorkflowStatus::rank`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Draft,
    PendingReview,
    PendingApproval,
    Approved,
    Published,
}

impl WorkflowStatus {
    /// Every status, lowest rank first.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::PendingReview,
        Self::PendingApproval,
        Self::Approved,
        Self::Published,
    ];

    /// Position in the lattice: `DRAFT = 0` through `PUBLISHED = 4`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::PendingReview => 1,
            Self::PendingApproval => 2,
            Self::Approved => 3,
            Self::Published => 4,
        }
    }

    /// Whether this status has progressed at least as far as `threshold`.
    #[must_use]
    pub const fn is_at_least(self, threshold: Self) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Valid next states from the current state, for any role.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::PendingReview],
            Self::PendingReview => &[Self::PendingApproval, Self::Draft],
            Self::PendingApproval => &[Self::Approved, Self::PendingReview],
            Self::Approved => &[Self::Published],
            Self::Published => &[Self::Approved],
        }
    }

    /// Check whether transitioning to `next` exists in the table at all.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        transitions::rule(self, next).is_some()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::PendingReview => "PENDING_REVIEW",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Published => "PUBLISHED",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// One of the six fixed roles. A user may hold several.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Lecturer,
    Hod,
    Aa,
    Principal,
    Student,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::Admin,
        Self::Lecturer,
        Self::Hod,
        Self::Aa,
        Self::Principal,
        Self::Student,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Lecturer => "LECTURER",
            Self::Hod => "HOD",
            Self::Aa => "AA",
            Self::Principal => "PRINCIPAL",
            Self::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    /// Role names are matched case-insensitively; stored form is upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == upper)
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// WorkflowActionType
// ---------------------------------------------------------------------------

/// Kind of state-changing operation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowActionType {
    Submit,
    HodApprove,
    HodReject,
    AaApprove,
    AaReject,
    Publish,
    Unpublish,
}

impl WorkflowActionType {
    pub const ALL: [Self; 7] = [
        Self::Submit,
        Self::HodApprove,
        Self::HodReject,
        Self::AaApprove,
        Self::AaReject,
        Self::Publish,
        Self::Unpublish,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "SUBMIT",
            Self::HodApprove => "HOD_APPROVE",
            Self::HodReject => "HOD_REJECT",
            Self::AaApprove => "AA_APPROVE",
            Self::AaReject => "AA_REJECT",
            Self::Publish => "PUBLISH",
            Self::Unpublish => "UNPUBLISH",
        }
    }
}

impl fmt::Display for WorkflowActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CoreError::UnknownAction(s.to_string()))
    }
}
