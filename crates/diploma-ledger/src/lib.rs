//! # Diploma Ledger
//!
//! The unified API for diploma records: an approval workflow off-chain, an
//! immutable fingerprint on a permissioned ledger, and verification that the
//! two still agree.
//!
//! ## Overview
//!
//! - **Records**: A diploma's fields plus three documents (portrait, diploma, transcript)
//! - **Lifecycle**: `PENDING -> APPROVED -> ISSUED -> REVOKED`, with rejection and resubmission
//! - **Record hash**: SHA-256 of an eleven-line canonical text built from fields and document digests
//! - **Ledger**: Issue and revoke are single-shot ledger writes made under the caller's signing credential
//! - **Verification**: Recompute the record hash off-chain and compare it with the ledger entry
//!
//! ## Key Concepts
//!
//! - **Serial lock**: Transitions of one serial number never interleave.
//! - **Ledger first**: Off-chain status only advances after the ledger write succeeds.
//! - **Mismatch is data**: A differing hash is reported by [`VerifyReport`], not raised.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use diploma_ledger::{NewCredential, Registry, RegistryConfig};
//! use diploma_ledger::chain::{EmbeddedLedger, EmbeddedLedgerConfig, Gateway, GatewayConfig};
//! use diploma_ledger::store::SqliteStore;
//!
//! async fn example(submission: &[u8], wallet: &[u8]) {
//!     let ledger = EmbeddedLedger::new(EmbeddedLedgerConfig::default());
//!     let registry = Registry::new(
//!         SqliteStore::open("diplomas.db").unwrap(),
//!         Gateway::new(ledger.connector(), GatewayConfig::default()),
//!         RegistryConfig::default(),
//!     );
//!
//!     let record = registry
//!         .create(NewCredential::from_json(submission).unwrap(), "officer")
//!         .await
//!         .unwrap();
//!     // ... attach documents, approve ...
//!
//!     let credential = registry.load_credential(wallet).unwrap();
//!     let issued = registry.issue(&record.serial_no, &credential, "rector").await.unwrap();
//!     println!("issued in {}", issued.entry.tx_id);
//!
//!     let report = registry.verify(&record.serial_no).await.unwrap();
//!     assert!(report.matches);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `diploma_ledger::core` - Canonical form, hashing, lifecycle and record types
//! - `diploma_ledger::store` - Off-chain storage abstraction and SQLite
//! - `diploma_ledger::chain` - Ledger contract, channels and gateway

pub mod config;
pub mod error;
pub mod locks;
pub mod registry;
pub mod verify;

// Re-export component crates
pub use diploma_ledger_chain as chain;
pub use diploma_ledger_core as core;
pub use diploma_ledger_store as store;

// Re-export main types for convenience
pub use config::{RegistryConfig, UploadLimits};
pub use error::{RegistryError, Result};
pub use locks::{SerialGuard, SerialLocks};
pub use registry::{LedgerWrite, NewCredential, Registry, RecordHashReport};
pub use verify::{ConsistencyVerifier, OffchainView, VerifyReport};

// Re-export commonly used types
pub use diploma_ledger_chain::{LedgerEntry, LedgerGateway, LedgerStatus};
pub use diploma_ledger_core::{
    CredentialFields, CredentialRecord, CredentialStatus, DocumentBlob, DocumentKind, ErrorClass,
    LifecycleAction, RecordHash, SerialNumber, SigningCredential,
};
pub use diploma_ledger_store::RecordStore;
