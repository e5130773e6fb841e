//! Error types for the diploma ledger core.

use thiserror::Error;

use crate::lifecycle::{CredentialStatus, LifecycleAction};
use crate::types::DocumentKind;

/// Coarse error taxonomy shared by every crate in the workspace.
///
/// Callers branch on the class, not on individual variants. Only
/// `Transport` is eligible for caller-initiated retry, and a retried
/// issue/revoke must re-read ledger state first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Missing or malformed input. Rejected before any state change.
    Validation,
    /// Unknown serial number, off-chain or on the ledger.
    NotFound,
    /// The request is well-formed but illegal in the current state.
    Conflict,
    /// Ledger unreachable or the signing identity was rejected.
    Transport,
    /// Off-chain persistence failure.
    Storage,
}

impl ErrorClass {
    /// The wire-level name of this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Transport => "TRANSPORT",
            Self::Storage => "STORAGE",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("invalid serial number: {0}")]
    InvalidSerial(String),

    #[error("invalid gpa: {0}")]
    InvalidGpa(String),

    #[error("gpa {0} outside 0.00-4.00")]
    GpaOutOfRange(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid graduation year: {0}")]
    InvalidYear(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("recordHash must be 64 hex chars")]
    InvalidRecordHash,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("invalid signing credential: {0}")]
    InvalidCredential(String),

    #[error("{kind} is {size} bytes, limit is {limit}")]
    DocumentTooLarge {
        kind: DocumentKind,
        size: usize,
        limit: usize,
    },

    #[error("signing credential is {size} bytes, limit is {limit}")]
    CredentialTooLarge { size: usize, limit: usize },

    #[error("unsupported mime type for {kind}: {mime_type}")]
    UnsupportedMimeType { kind: DocumentKind, mime_type: String },

    #[error("invalid document kind: {0}")]
    InvalidDocumentKind(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid lifecycle action: {0}")]
    InvalidAction(String),
}

impl ValidationError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }
}

/// Lifecycle errors: an action attempted from a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The action is not defined from the current status.
    #[error("INVALID_TRANSITION: cannot {action} from {from}")]
    InvalidTransition {
        from: CredentialStatus,
        action: LifecycleAction,
    },

    /// The transition exists but its guard does not hold.
    #[error("guard violation: cannot {action} from {from}: {reason}")]
    GuardViolation {
        from: CredentialStatus,
        action: LifecycleAction,
        reason: String,
    },

    /// A record hash was requested before all three documents were attached.
    #[error("record hash unavailable, missing documents: {}", missing_documents(.missing))]
    MissingDocuments { missing: Vec<DocumentKind> },
}

impl LifecycleError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Conflict
    }
}

/// Render missing kinds as `MISSING_FILE_<KIND>` codes.
pub(crate) fn missing_documents(missing: &[DocumentKind]) -> String {
    missing
        .iter()
        .map(|k| format!("MISSING_FILE_{}", k.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
