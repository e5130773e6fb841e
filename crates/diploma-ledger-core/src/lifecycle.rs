//! The credential lifecycle graph.
//!
//! ```text
//!            approve             issue              revoke
//!  PENDING ───────────> APPROVED ──────> ISSUED ──────────> REVOKED
//!   │  ^ ^                  │
//!   │  │ └── edit           │ reject-issue
//!   │  │                    v
//!   │  └─ resubmit/edit ─ REJECTED <──┐
//!   └──────────── reject ─────────────┘
//! ```
//!
//! Every function here is pure. Callers hold the per-serial lock while they
//! read the current status, plan the transition and commit it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{missing_documents, LifecycleError, ValidationError};
use crate::record::DocumentDigests;

/// Status of an off-chain credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Pending,
    Approved,
    Rejected,
    Issued,
    Revoked,
}

impl CredentialStatus {
    /// Status of a freshly created record.
    pub const INITIAL: Self = Self::Pending;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Issued => "ISSUED",
            Self::Revoked => "REVOKED",
        }
    }

    /// No action leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Whether fields and documents may be changed.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::Rejected)
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "ISSUED" => Ok(Self::Issued),
            "REVOKED" => Ok(Self::Revoked),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// An action that moves a record along the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleAction {
    Approve,
    Reject,
    Resubmit,
    Edit,
    Issue,
    RejectIssue,
    Revoke,
}

impl LifecycleAction {
    pub const ALL: [LifecycleAction; 7] = [
        Self::Approve,
        Self::Reject,
        Self::Resubmit,
        Self::Edit,
        Self::Issue,
        Self::RejectIssue,
        Self::Revoke,
    ];

    /// Name used in audit logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Resubmit => "RESUBMIT",
            Self::Edit => "EDIT",
            Self::Issue => "ISSUE",
            Self::RejectIssue => "REJECT_ISSUE",
            Self::Revoke => "REVOKE",
        }
    }

    /// Actions that write to the ledger.
    pub fn is_ledger_write(&self) -> bool {
        matches!(self, Self::Issue | Self::Revoke)
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Resubmit => "resubmit",
            Self::Edit => "edit",
            Self::Issue => "issue",
            Self::RejectIssue => "reject-issue",
            Self::Revoke => "revoke",
        };
        f.write_str(name)
    }
}

impl FromStr for LifecycleAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.code() == s)
            .ok_or_else(|| ValidationError::InvalidAction(s.to_string()))
    }
}

/// Target status of `action` from `from`, ignoring guards.
///
/// Fails with `INVALID_TRANSITION` when the graph has no such edge.
pub fn next_status(
    from: CredentialStatus,
    action: LifecycleAction,
) -> Result<CredentialStatus, LifecycleError> {
    use CredentialStatus::*;
    use LifecycleAction::*;

    let to = match (from, action) {
        (Pending, Approve) => Approved,
        (Pending, Reject) => Rejected,
        (Pending, Edit) => Pending,
        (Rejected, Resubmit) => Pending,
        (Rejected, Edit) => Pending,
        (Approved, Issue) => Issued,
        (Approved, RejectIssue) => Rejected,
        (Issued, Revoke) => Revoked,
        _ => return Err(LifecycleError::InvalidTransition { from, action }),
    };
    Ok(to)
}

/// Plan an issue: the edge must exist and all three documents must be present.
pub fn plan_issue(
    from: CredentialStatus,
    digests: &DocumentDigests,
) -> Result<CredentialStatus, LifecycleError> {
    let to = next_status(from, LifecycleAction::Issue)?;
    let missing = digests.missing();
    if !missing.is_empty() {
        return Err(LifecycleError::GuardViolation {
            from,
            action: LifecycleAction::Issue,
            reason: missing_documents(&missing),
        });
    }
    Ok(to)
}

/// Actions with an outgoing edge from `status`.
pub fn allowed_actions(status: CredentialStatus) -> Vec<LifecycleAction> {
    LifecycleAction::ALL
        .into_iter()
        .filter(|a| next_status(status, *a).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha256Digest;
    use crate::types::DocumentKind;

    use CredentialStatus::*;
    use LifecycleAction::*;

    const STATUSES: [CredentialStatus; 5] = [Pending, Approved, Rejected, Issued, Revoked];

    #[test]
    fn test_graph_edges() {
        assert_eq!(next_status(Pending, Approve).unwrap(), Approved);
        assert_eq!(next_status(Pending, Reject).unwrap(), Rejected);
        assert_eq!(next_status(Rejected, Resubmit).unwrap(), Pending);
        assert_eq!(next_status(Rejected, Edit).unwrap(), Pending);
        assert_eq!(next_status(Pending, Edit).unwrap(), Pending);
        assert_eq!(next_status(Approved, Issue).unwrap(), Issued);
        assert_eq!(next_status(Approved, RejectIssue).unwrap(), Rejected);
        assert_eq!(next_status(Issued, Revoke).unwrap(), Revoked);
    }

    #[test]
    fn test_invalid_transitions() {
        let err = next_status(Pending, Issue).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                from: Pending,
                action: Issue
            }
        );
        assert!(next_status(Approved, Revoke).is_err());
        assert!(next_status(Issued, Issue).is_err());
        assert!(next_status(Approved, Edit).is_err());
    }

    #[test]
    fn test_revoked_is_terminal() {
        assert!(Revoked.is_terminal());
        assert!(allowed_actions(Revoked).is_empty());
        for status in STATUSES {
            if status != Revoked {
                assert!(!allowed_actions(status).is_empty(), "{status} has no exits");
            }
        }
    }

    #[test]
    fn test_editable_matches_graph() {
        for status in STATUSES {
            assert_eq!(status.is_editable(), next_status(status, Edit).is_ok());
        }
    }

    #[test]
    fn test_issue_guard() {
        let mut digests = DocumentDigests::default();
        digests.set(DocumentKind::Portrait, Sha256Digest::hash(b"p"));

        let err = plan_issue(Approved, &digests).unwrap_err();
        match err {
            LifecycleError::GuardViolation { from, action, reason } => {
                assert_eq!(from, Approved);
                assert_eq!(action, Issue);
                assert_eq!(reason, "MISSING_FILE_DIPLOMA, MISSING_FILE_TRANSCRIPT");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        digests.set(DocumentKind::Diploma, Sha256Digest::hash(b"d"));
        digests.set(DocumentKind::Transcript, Sha256Digest::hash(b"t"));
        assert_eq!(plan_issue(Approved, &digests).unwrap(), Issued);

        // The graph is checked before the guard.
        assert!(matches!(
            plan_issue(Pending, &digests),
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_status_and_action_codes() {
        for status in STATUSES {
            assert_eq!(status.as_str().parse::<CredentialStatus>().unwrap(), status);
        }
        for action in LifecycleAction::ALL {
            assert_eq!(action.code().parse::<LifecycleAction>().unwrap(), action);
        }
        assert_eq!(RejectIssue.to_string(), "reject-issue");
        assert!("DELETED".parse::<CredentialStatus>().is_err());
    }
}
