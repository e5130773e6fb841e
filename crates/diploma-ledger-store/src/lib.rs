//! # Diploma Ledger Store
//!
//! Off-chain storage for diploma records. Provides a trait-based interface
//! for record, document and audit-log persistence with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The store abstracts persistence behind the [`RecordStore`] trait,
//! allowing the registry to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`Transition`] - A status change and everything committed with it
//!
//! ## Usage
//!
//! ```rust,no_run
//! use diploma_ledger_store::{RecordFilter, RecordStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("diplomas.db").unwrap();
//!     let recent = store.list_records(&RecordFilter::default()).await.unwrap();
//!     println!("{} records", recent.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unique serials**: Inserting an existing serial returns `SerialExists`
//! - **Compare-and-set**: A transition planned from a stale status returns `StatusConflict`
//! - **Atomic audit**: Approval and chain log entries commit with the status change

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{
    ApprovalLogEntry, ChainLogEntry, ChainReceipt, RecordFilter, RecordStore, Transition,
};
