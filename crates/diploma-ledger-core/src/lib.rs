//! # Diploma Ledger Core
//!
//! Pure primitives for the diploma ledger: canonical form, record hashing,
//! and the credential lifecycle.
//!
//! This crate contains no I/O, no storage, no networking. Everything here is
//! a deterministic function of its inputs.
//!
//! ## Key Types
//!
//! - [`CredentialRecord`] - The off-chain source of truth for one diploma
//! - [`CanonicalForm`] - Eleven-line text fingerprinted by [`RecordHash`]
//! - [`CredentialStatus`] - Lifecycle status, moved by [`LifecycleAction`]
//! - [`SigningCredential`] - Per-call ledger signing identity
//!
//! ## Canonicalization
//!
//! See the [`canonical`] module for the exact text layout.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod record;
pub mod types;
pub mod validation;

pub use canonical::{canonical_form, record_hash, CanonicalForm};
pub use crypto::{digest_hex, RecordHash, Sha256Digest};
pub use error::{ErrorClass, LifecycleError, ValidationError};
pub use identity::SigningCredential;
pub use lifecycle::{allowed_actions, next_status, plan_issue, CredentialStatus, LifecycleAction};
pub use record::{CredentialFields, CredentialRecord, DocumentBlob, DocumentDigests};
pub use types::{DocumentKind, Gpa, SerialNumber};
pub use validation::{parse_record_hash, LooseValue, RawCredentialFields, RawSubmission};
