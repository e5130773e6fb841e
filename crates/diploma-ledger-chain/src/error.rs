//! Error types for the ledger module.

use diploma_ledger_core::{ErrorClass, ValidationError};
use thiserror::Error;

/// Errors raised by the diploma contract.
///
/// The `Display` form is the exact message the contract returns across the
/// channel; [`ContractError::from_message`] parses it back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("NOT_FOUND")]
    NotFound,

    #[error("ALREADY_EXISTS")]
    AlreadyExists,

    #[error("NOT_ISSUED")]
    NotIssued,

    #[error("serialNo required")]
    SerialRequired,

    #[error("MISSING_FIELD:{0}")]
    MissingField(String),

    #[error("recordHash must be 64 hex chars")]
    InvalidRecordHash,

    #[error("INVALID_ARGUMENT:{0}")]
    InvalidArgument(String),

    #[error("UNKNOWN_FUNCTION:{0}")]
    UnknownFunction(String),

    /// A message this client does not recognize.
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Parse a contract error message received over a channel.
    pub fn from_message(message: &str) -> Self {
        let message = message.trim();
        match message {
            "NOT_FOUND" => return Self::NotFound,
            "ALREADY_EXISTS" => return Self::AlreadyExists,
            "NOT_ISSUED" => return Self::NotIssued,
            "serialNo required" => return Self::SerialRequired,
            "recordHash must be 64 hex chars" => return Self::InvalidRecordHash,
            _ => {}
        }
        if let Some(field) = message.strip_prefix("MISSING_FIELD:") {
            return Self::MissingField(field.to_string());
        }
        if let Some(detail) = message.strip_prefix("INVALID_ARGUMENT:") {
            return Self::InvalidArgument(detail.to_string());
        }
        if let Some(function) = message.strip_prefix("UNKNOWN_FUNCTION:") {
            return Self::UnknownFunction(function.to_string());
        }
        Self::Other(message.to_string())
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound => ErrorClass::NotFound,
            Self::AlreadyExists | Self::NotIssued => ErrorClass::Conflict,
            Self::SerialRequired
            | Self::MissingField(_)
            | Self::InvalidRecordHash
            | Self::InvalidArgument(_) => ErrorClass::Validation,
            Self::UnknownFunction(_) | Self::Other(_) => ErrorClass::Transport,
        }
    }
}

/// Errors that can occur talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The contract rejected the call.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),

    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger refused the caller's signing identity.
    #[error("credential rejected: {0}")]
    CredentialRejected(String),

    /// The ledger answered with something that is not a ledger entry.
    #[error("malformed ledger response: {0}")]
    MalformedResponse(String),

    /// Input rejected before any ledger call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Contract(e) => e.class(),
            Self::Unavailable(_) | Self::CredentialRejected(_) | Self::MalformedResponse(_) => {
                ErrorClass::Transport
            }
            Self::Validation(e) => e.class(),
        }
    }

    /// The key has no ledger entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Contract(ContractError::NotFound))
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
