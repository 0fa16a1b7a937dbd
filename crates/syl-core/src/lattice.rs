//! String-level access to the status lattice.
//!
//! Typed code should use [`WorkflowStatus::rank`] and
//! [`WorkflowStatus::is_at_least`]. These helpers exist for untyped input
//! (CLI arguments, raw rows) where an unrecognized status must be reported
//! as non-comparable instead of being ranked lowest.

use crate::enums::WorkflowStatus;

/// Rank of a stored status string, or `None` if it is not one of the five states.
#[must_use]
pub fn rank(status: &str) -> Option<u8> {
    status.parse::<WorkflowStatus>().ok().map(WorkflowStatus::rank)
}

/// `status >= threshold` in the lattice. False when either side is unknown.
#[must_use]
pub fn is_at_least(status: &str, threshold: &str) -> bool {
    match (rank(status), rank(threshold)) {
        (Some(current), Some(min)) => current >= min,
        _ => false,
    }
}
