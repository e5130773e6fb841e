//! Error types for the store module.

use diploma_ledger_core::{CredentialStatus, ErrorClass, LifecycleAction};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record with this serial number already exists.
    #[error("serial number already exists: {0}")]
    SerialExists(String),

    /// Record not found.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The record moved to another status since it was read.
    #[error("{serial_no}: cannot {action}, status is {actual}, expected {expected}")]
    StatusConflict {
        serial_no: String,
        action: LifecycleAction,
        expected: CredentialStatus,
        actual: CredentialStatus,
    },

    /// Invalid data in storage or in a write request.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::SerialExists(_) | Self::StatusConflict { .. } => ErrorClass::Conflict,
            Self::NotFound(_) => ErrorClass::NotFound,
            _ => ErrorClass::Storage,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
