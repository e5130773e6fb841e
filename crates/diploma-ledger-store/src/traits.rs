//! RecordStore trait: the abstract interface for off-chain persistence.
//!
//! This trait keeps the registry storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diploma_ledger_core::{
    CredentialFields, CredentialRecord, CredentialStatus, DocumentBlob, DocumentKind,
    LifecycleAction, RecordHash, SerialNumber,
};

use crate::error::{Result, StoreError};

/// Filter for listing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive substring of serial number, student id or student name.
    pub query: Option<String>,
    pub status: Option<CredentialStatus>,
    pub limit: usize,
}

impl RecordFilter {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn matches(&self, record: &CredentialRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let needle = q.to_lowercase();
                let hit = |s: &str| s.to_lowercase().contains(&needle);
                hit(record.serial_no.as_str())
                    || record.fields.student_id.as_deref().is_some_and(hit)
                    || record.fields.student_name.as_deref().is_some_and(hit)
            }
        }
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            query: None,
            status: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One workflow step in the approval log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalLogEntry {
    pub serial_no: SerialNumber,
    pub action: LifecycleAction,
    pub from: CredentialStatus,
    pub to: CredentialStatus,
    pub actor: String,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

/// One committed ledger transaction in the chain log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLogEntry {
    pub serial_no: SerialNumber,
    pub action: LifecycleAction,
    pub actor: String,
    pub tx_id: String,
    pub record_hash: Option<RecordHash>,
    pub onchain_status: String,
    pub at: DateTime<Utc>,
}

/// What the ledger returned for an issue or revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub tx_id: String,
    pub record_hash: Option<RecordHash>,
    pub onchain_status: String,
}

/// A status change plus everything that must commit with it.
///
/// Applied as compare-and-set: the store rejects it with
/// [`StoreError::StatusConflict`](crate::StoreError::StatusConflict) unless
/// the record is still in `from`.
#[derive(Debug, Clone)]
pub struct Transition {
    pub serial_no: SerialNumber,
    pub action: LifecycleAction,
    pub from: CredentialStatus,
    pub to: CredentialStatus,
    pub actor: String,
    pub at: DateTime<Utc>,
    pub note: Option<String>,
    /// Replacement fields (edits only).
    pub fields: Option<CredentialFields>,
    /// Replacement documents (edits only). Upserted by kind.
    pub documents: Vec<DocumentBlob>,
    /// Ledger result (issue and revoke only).
    pub chain: Option<ChainReceipt>,
}

impl Transition {
    pub fn new(
        serial_no: SerialNumber,
        action: LifecycleAction,
        from: CredentialStatus,
        to: CredentialStatus,
        actor: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            serial_no,
            action,
            from,
            to,
            actor: actor.into(),
            at,
            note: None,
            fields: None,
            documents: Vec::new(),
            chain: None,
        }
    }

    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    pub fn fields(mut self, fields: CredentialFields) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn document(mut self, blob: DocumentBlob) -> Self {
        self.documents.push(blob);
        self
    }

    pub fn chain(mut self, receipt: ChainReceipt) -> Self {
        self.chain = Some(receipt);
        self
    }

    /// Apply the bookkeeping columns of this transition to a record.
    pub fn apply_to(&self, record: &mut CredentialRecord) {
        record.status = self.to;
        record.updated_at = self.at;
        if let Some(fields) = &self.fields {
            record.fields = fields.clone();
        }
        match self.action {
            LifecycleAction::Approve => {
                record.approved_by = Some(self.actor.clone());
                record.approved_at = Some(self.at);
            }
            LifecycleAction::Issue => {
                record.issued_by = Some(self.actor.clone());
                record.issued_at = Some(self.at);
            }
            LifecycleAction::Revoke => {
                record.revoked_by = Some(self.actor.clone());
                record.revoked_at = Some(self.at);
            }
            _ => {}
        }
    }

    /// The audit entry this transition appends to the approval log, if any.
    pub fn approval_entry(&self) -> Option<ApprovalLogEntry> {
        if self.action.is_ledger_write() {
            return None;
        }
        Some(ApprovalLogEntry {
            serial_no: self.serial_no.clone(),
            action: self.action,
            from: self.from,
            to: self.to,
            actor: self.actor.clone(),
            note: self.note.clone(),
            at: self.at,
        })
    }

    /// The audit entry this transition appends to the chain log, if any.
    pub fn chain_entry(&self) -> Option<ChainLogEntry> {
        let receipt = self.chain.as_ref()?;
        Some(ChainLogEntry {
            serial_no: self.serial_no.clone(),
            action: self.action,
            actor: self.actor.clone(),
            tx_id: receipt.tx_id.clone(),
            record_hash: receipt.record_hash,
            onchain_status: receipt.onchain_status.clone(),
            at: self.at,
        })
    }

    /// Structural checks shared by every backend.
    pub fn check(&self) -> Result<()> {
        if self.action.is_ledger_write() != self.chain.is_some() {
            return Err(StoreError::InvalidData(format!(
                "{} transition must {}carry a ledger receipt",
                self.action,
                if self.action.is_ledger_write() { "" } else { "not " }
            )));
        }
        let edits = self.fields.is_some() || !self.documents.is_empty();
        if edits && self.action != LifecycleAction::Edit {
            return Err(StoreError::InvalidData(format!(
                "{} transition cannot change fields or documents",
                self.action
            )));
        }
        Ok(())
    }
}

/// The RecordStore trait: async interface for off-chain persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Unique serials**: Inserting an existing serial returns `SerialExists`.
/// - **Compare-and-set transitions**: A transition commits only if the record
///   is still in the status it was planned from.
/// - **Atomic audit**: Log entries commit in the same write as the status.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new record together with its initial documents.
    async fn insert_record(&self, record: &CredentialRecord, documents: &[DocumentBlob])
        -> Result<()>;

    /// Get a record by serial number.
    async fn get_record(&self, serial_no: &SerialNumber) -> Result<Option<CredentialRecord>>;

    /// List records matching a filter, newest first, at most `filter.limit`.
    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<CredentialRecord>>;

    /// Apply a transition atomically with its documents and log entries.
    ///
    /// # Returns
    /// The record as committed.
    async fn apply_transition(&self, transition: &Transition) -> Result<CredentialRecord>;

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// All documents attached to a record, in canonical kind order.
    async fn get_documents(&self, serial_no: &SerialNumber) -> Result<Vec<DocumentBlob>>;

    /// Read a record and its documents as one consistent snapshot.
    async fn get_record_with_documents(
        &self,
        serial_no: &SerialNumber,
    ) -> Result<Option<(CredentialRecord, Vec<DocumentBlob>)>>;

    /// One document by kind.
    async fn get_document(
        &self,
        serial_no: &SerialNumber,
        kind: DocumentKind,
    ) -> Result<Option<DocumentBlob>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Approval log for a record, oldest first.
    async fn approval_log(&self, serial_no: &SerialNumber) -> Result<Vec<ApprovalLogEntry>>;

    /// Chain log for a record, oldest first.
    async fn chain_log(&self, serial_no: &SerialNumber) -> Result<Vec<ChainLogEntry>>;
}
