//! Error types for the registry.

use diploma_ledger_chain::LedgerError;
use diploma_ledger_core::{ErrorClass, LifecycleError, SerialNumber, ValidationError};
use diploma_ledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Input rejected before any state change.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The action is not allowed from the record's current status.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Off-chain storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// No off-chain record with this serial number.
    #[error("diploma not found: {0}")]
    NotFound(SerialNumber),
}

impl RegistryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(e) => e.class(),
            Self::Lifecycle(e) => e.class(),
            Self::Store(e) => e.class(),
            Self::Ledger(e) => e.class(),
            Self::NotFound(_) => ErrorClass::NotFound,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
