//! The closed transition table.
//!
//! Every legal `(from, to)` pair is listed once, together with the roles
//! that may trigger it, the audit action it records, and the timestamp
//! effect it has on the version row. Anything not listed is invalid,
//! including same-state no-ops and skipped stages.

use crate::enums::{Role, WorkflowActionType, WorkflowStatus};

/// How a transition touches the version's lifecycle timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEffect {
    None,
    StampSubmitted,
    StampApproved,
    ClearApproved,
    StampPublished,
    ClearPublished,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
    pub allowed_roles: &'static [Role],
    pub action: WorkflowActionType,
    pub effect: TimestampEffect,
}

impl TransitionRule {
    #[must_use]
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

const SUBMIT: TransitionRule = TransitionRule {
    from: WorkflowStatus::Draft,
    to: WorkflowStatus::PendingReview,
    allowed_roles: &[Role::Lecturer],
    action: WorkflowActionType::Submit,
    effect: TimestampEffect::StampSubmitted,
};

const HOD_APPROVE: TransitionRule = TransitionRule {
    from: WorkflowStatus::PendingReview,
    to: WorkflowStatus::PendingApproval,
    allowed_roles: &[Role::Hod],
    action: WorkflowActionType::HodApprove,
    effect: TimestampEffect::StampApproved,
};

const HOD_REJECT: TransitionRule = TransitionRule {
    from: WorkflowStatus::PendingReview,
    to: WorkflowStatus::Draft,
    allowed_roles: &[Role::Hod],
    action: WorkflowActionType::HodReject,
    effect: TimestampEffect::None,
};

const AA_APPROVE: TransitionRule = TransitionRule {
    from: WorkflowStatus::PendingApproval,
    to: WorkflowStatus::Approved,
    allowed_roles: &[Role::Aa],
    action: WorkflowActionType::AaApprove,
    effect: TimestampEffect::StampApproved,
};

const AA_REJECT: TransitionRule = TransitionRule {
    from: WorkflowStatus::PendingApproval,
    to: WorkflowStatus::PendingReview,
    allowed_roles: &[Role::Aa],
    action: WorkflowActionType::AaReject,
    effect: TimestampEffect::ClearApproved,
};

const PUBLISH: TransitionRule = TransitionRule {
    from: WorkflowStatus::Approved,
    to: WorkflowStatus::Published,
    allowed_roles: &[Role::Admin, Role::Principal],
    action: WorkflowActionType::Publish,
    effect: TimestampEffect::StampPublished,
};

const UNPUBLISH: TransitionRule = TransitionRule {
    from: WorkflowStatus::Published,
    to: WorkflowStatus::Approved,
    allowed_roles: &[Role::Admin, Role::Principal],
    action: WorkflowActionType::Unpublish,
    effect: TimestampEffect::ClearPublished,
};

/// The full table, in workflow order.
pub const TRANSITIONS: [TransitionRule; 7] = [
    SUBMIT,
    HOD_APPROVE,
    HOD_REJECT,
    AA_APPROVE,
    AA_REJECT,
    PUBLISH,
    UNPUBLISH,
];

/// Look up the rule for `(from, to)`.
///
/// Uses an exhaustive match so that adding a `WorkflowStatus` variant
/// forces every pair to be reconsidered.
#[must_use]
#[allow(clippy::match_same_arms)]
pub const fn rule(from: WorkflowStatus, to: WorkflowStatus) -> Option<&'static TransitionRule> {
    use WorkflowStatus::{Approved, Draft, PendingApproval, PendingReview, Published};
    match (from, to) {
        (Draft, PendingReview) => Some(&SUBMIT),
        (PendingReview, PendingApproval) => Some(&HOD_APPROVE),
        (PendingReview, Draft) => Some(&HOD_REJECT),
        (PendingApproval, Approved) => Some(&AA_APPROVE),
        (PendingApproval, PendingReview) => Some(&AA_REJECT),
        (Approved, Published) => Some(&PUBLISH),
        (Published, Approved) => Some(&UNPUBLISH),
        (Draft, Draft | PendingApproval | Approved | Published)
        | (PendingReview, PendingReview | Approved | Published)
        | (PendingApproval, Draft | PendingApproval | Published)
        | (Approved, Draft | PendingReview | PendingApproval | Approved)
        | (Published, Draft | PendingReview | PendingApproval | Published) => None,
    }
}

/// The single rule recorded under `action`.
#[must_use]
pub const fn for_action(action: WorkflowActionType) -> &'static TransitionRule {
    match action {
        WorkflowActionType::Submit => &SUBMIT,
        WorkflowActionType::HodApprove => &HOD_APPROVE,
        WorkflowActionType::HodReject => &HOD_REJECT,
        WorkflowActionType::AaApprove => &AA_APPROVE,
        WorkflowActionType::AaReject => &AA_REJECT,
        WorkflowActionType::Publish => &PUBLISH,
        WorkflowActionType::Unpublish => &UNPUBLISH,
    }
}

/// Roles allowed to perform `(from, to)`; empty when the pair is not in the table.
#[must_use]
pub const fn allowed_roles(from: WorkflowStatus, to: WorkflowStatus) -> &'static [Role] {
    match rule(from, to) {
        Some(rule) => rule.allowed_roles,
        None => &[],
    }
}

/// True iff `(from, to)` is in the table and `role` is in its allowed set.
#[must_use]
pub fn validate_transition(from: WorkflowStatus, to: WorkflowStatus, role: Role) -> bool {
    rule(from, to).is_some_and(|rule| rule.allows(role))
}

/// First role in `roles` that may perform `(from, to)`, if any.
#[must_use]
pub fn authorizing_role(from: WorkflowStatus, to: WorkflowStatus, roles: &[Role]) -> Option<Role> {
    roles
        .iter()
        .copied()
        .find(|role| validate_transition(from, to, *role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn match_and_table_list_the_same_rules() {
        let mut matched = 0;
        for from in WorkflowStatus::ALL {
            for to in WorkflowStatus::ALL {
                if let Some(rule) = rule(from, to) {
                    matched += 1;
                    assert_eq!((rule.from, rule.to), (from, to));
                    assert!(TRANSITIONS.contains(rule));
                }
            }
        }
        assert_eq!(matched, TRANSITIONS.len());
    }

    #[test]
    fn every_triple_outside_the_table_is_rejected() {
        for from in WorkflowStatus::ALL {
            for to in WorkflowStatus::ALL {
                for role in Role::ALL {
                    let listed = TRANSITIONS
                        .iter()
                        .any(|r| r.from == from && r.to == to && r.allowed_roles.contains(&role));
                    assert_eq!(
                        validate_transition(from, to, role),
                        listed,
                        "{from} -> {to} as {role}"
                    );
                }
            }
        }
    }

    #[rstest]
    #[case(WorkflowStatus::Draft, WorkflowStatus::Approved)]
    #[case(WorkflowStatus::Draft, WorkflowStatus::Published)]
    #[case(WorkflowStatus::PendingReview, WorkflowStatus::Approved)]
    #[case(WorkflowStatus::Approved, WorkflowStatus::Draft)]
    #[case(WorkflowStatus::PendingApproval, WorkflowStatus::Draft)]
    fn skip_and_backward_jumps_are_invalid_for_all_roles(
        #[case] from: WorkflowStatus,
        #[case] to: WorkflowStatus,
    ) {
        for role in Role::ALL {
            assert!(!validate_transition(from, to, role), "{from} -> {to} as {role}");
        }
    }

    #[test]
    fn same_state_is_never_a_transition() {
        for status in WorkflowStatus::ALL {
            assert!(rule(status, status).is_none());
        }
    }

    #[test]
    fn reversed_submit_is_not_the_hod_reject_for_lecturers() {
        assert!(validate_transition(WorkflowStatus::Draft, WorkflowStatus::PendingReview, Role::Lecturer));
        assert!(!validate_transition(WorkflowStatus::PendingReview, WorkflowStatus::Draft, Role::Lecturer));
        assert!(validate_transition(WorkflowStatus::PendingReview, WorkflowStatus::Draft, Role::Hod));
    }

    #[test]
    fn aa_reject_returns_to_review() {
        let rule = rule(WorkflowStatus::PendingApproval, WorkflowStatus::PendingReview).unwrap();
        assert_eq!(rule.action, WorkflowActionType::AaReject);
        assert_eq!(rule.allowed_roles, &[Role::Aa]);
        assert!(super::rule(WorkflowStatus::PendingApproval, WorkflowStatus::Draft).is_none());
    }

    #[test]
    fn publish_accepts_admin_and_principal_only() {
        assert_eq!(
            allowed_roles(WorkflowStatus::Approved, WorkflowStatus::Published),
            &[Role::Admin, Role::Principal]
        );
        assert!(allowed_roles(WorkflowStatus::Draft, WorkflowStatus::Published).is_empty());
    }

    #[test]
    fn authorizing_role_picks_any_held_role() {
        let roles = [Role::Student, Role::Principal];
        assert_eq!(
            authorizing_role(WorkflowStatus::Approved, WorkflowStatus::Published, &roles),
            Some(Role::Principal)
        );
        assert_eq!(
            authorizing_role(WorkflowStatus::Draft, WorkflowStatus::PendingReview, &roles),
            None
        );
    }

    #[test]
    fn every_action_has_exactly_one_rule() {
        for action in WorkflowActionType::ALL {
            let rule = for_action(action);
            assert_eq!(rule.action, action);
            assert_eq!(TRANSITIONS.iter().filter(|r| r.action == action).count(), 1);
        }
    }

    #[test]
    fn timestamp_effects_match_lifecycle() {
        assert_eq!(SUBMIT.effect, TimestampEffect::StampSubmitted);
        assert_eq!(PUBLISH.effect, TimestampEffect::StampPublished);
        assert_eq!(UNPUBLISH.effect, TimestampEffect::ClearPublished);
    }
}
