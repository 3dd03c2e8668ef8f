//! Pre-merge validation - pure functions over fetched PR state
//!
//! No I/O happens here: the orchestrator fetches PR details and failing
//! checks upfront, and this module aggregates every failure so the user sees
//! the complete picture in one pass instead of failing on the first check.

use crate::types::{MergeStateStatus, MergeableState, PullRequestDetails, ReviewDecision};

/// A single pre-merge validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Review decision is anything other than APPROVED
    NotApproved(ReviewDecision),
    /// The PR has merge conflicts
    Conflicting,
    /// One or more CI checks are failing (check names)
    ChecksFailing(Vec<String>),
    /// Branch protection reports the merge as blocked
    BranchProtectionBlocked,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotApproved(decision) => {
                write!(f, "not approved (review decision: {decision})")
            }
            Self::Conflicting => write!(f, "has merge conflicts with the base branch"),
            Self::ChecksFailing(names) => {
                write!(f, "failing checks: {}", names.join(", "))
            }
            Self::BranchProtectionBlocked => {
                write!(f, "blocked by branch protection rules")
            }
        }
    }
}

/// Run every pre-merge check and return the full list of failures.
///
/// An empty list means ready to merge. Each check is independent and
/// individually reportable:
/// - review decision must be APPROVED
/// - mergeable state must not be CONFLICTING (UNKNOWN passes)
/// - no CI check may be failing
/// - merge-state status must not be BLOCKED
#[must_use]
pub fn evaluate(
    details: &PullRequestDetails,
    failing_checks: &[String],
) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if details.review_decision != ReviewDecision::Approved {
        failures.push(ValidationFailure::NotApproved(details.review_decision));
    }

    if details.mergeable == MergeableState::Conflicting {
        failures.push(ValidationFailure::Conflicting);
    }

    if !failing_checks.is_empty() {
        failures.push(ValidationFailure::ChecksFailing(failing_checks.to_vec()));
    }

    if details.merge_state_status == MergeStateStatus::Blocked {
        failures.push(ValidationFailure::BranchProtectionBlocked);
    }

    failures
}

/// Uncertainty notes that are not definitive blockers (e.g. the tracker is
/// still computing mergeability). Surfaced as informational output, never as
/// failures.
#[must_use]
pub fn uncertainties(details: &PullRequestDetails) -> Vec<String> {
    let mut notes = Vec::new();
    if details.mergeable == MergeableState::Unknown {
        notes.push("merge status unknown (still computing)".to_string());
    }
    if details.merge_state_status == MergeStateStatus::Unknown {
        notes.push("merge-state status not yet reported".to_string());
    }
    notes
}
