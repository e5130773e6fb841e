//! # Diploma Ledger Testkit
//!
//! Testing utilities for the diploma ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known records with expected canonical text and record hash
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Sample records, documents, signing wallets and an embedded ledger
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical form and record hash across implementations:
//!
//! ```rust
//! use diploma_ledger_testkit::vectors::{all_vectors, record_hash_from_vector};
//!
//! for vector in all_vectors() {
//!     let hash = record_hash_from_vector(&vector);
//!     assert_eq!(hash.to_hex(), vector.expected_record_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use diploma_ledger_testkit::generators::RecordParams;
//!
//! proptest! {
//!     #[test]
//!     fn record_hash_is_deterministic(params: RecordParams) {
//!         prop_assert_eq!(params.record_hash(), params.record_hash());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use diploma_ledger_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let gateway = fixture.gateway();
//! let bundle = fixture.wallet.bundle_json();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_documents, sample_fields, sample_serial, TestFixture, TestWallet};
pub use generators::RecordParams;
pub use vectors::{all_vectors, record_hash_from_vector, verify_all_vectors, GoldenVector};
