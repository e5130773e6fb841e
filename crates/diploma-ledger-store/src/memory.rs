//! In-memory implementation of the RecordStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use diploma_ledger_core::{CredentialRecord, DocumentBlob, DocumentKind, SerialNumber};

use crate::error::{Result, StoreError};
use crate::traits::{ApprovalLogEntry, ChainLogEntry, RecordFilter, RecordStore, Transition};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; every
/// write happens under one write guard, so readers never see half a transition.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records with their insertion sequence (for newest-first listing).
    records: HashMap<SerialNumber, (u64, CredentialRecord)>,

    /// Documents by serial, ordered by kind.
    documents: HashMap<SerialNumber, BTreeMap<DocumentKind, DocumentBlob>>,

    approval_log: Vec<ApprovalLogEntry>,

    chain_log: Vec<ChainLogEntry>,

    next_seq: u64,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_record(
        &self,
        record: &CredentialRecord,
        documents: &[DocumentBlob],
    ) -> Result<()> {
        let mut inner = self.write()?;

        if inner.records.contains_key(&record.serial_no) {
            return Err(StoreError::SerialExists(record.serial_no.to_string()));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .records
            .insert(record.serial_no.clone(), (seq, record.clone()));

        let docs = inner.documents.entry(record.serial_no.clone()).or_default();
        for blob in documents {
            docs.insert(blob.kind, blob.clone());
        }

        Ok(())
    }

    async fn get_record(&self, serial_no: &SerialNumber) -> Result<Option<CredentialRecord>> {
        let inner = self.read()?;
        Ok(inner.records.get(serial_no).map(|(_, r)| r.clone()))
    }

    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<CredentialRecord>> {
        let inner = self.read()?;

        let mut rows: Vec<&(u64, CredentialRecord)> = inner
            .records
            .values()
            .filter(|(_, r)| filter.matches(r))
            .collect();
        rows.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });

        Ok(rows
            .into_iter()
            .take(filter.limit)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn apply_transition(&self, transition: &Transition) -> Result<CredentialRecord> {
        transition.check()?;
        let mut inner = self.write()?;

        let (_, record) = inner
            .records
            .get_mut(&transition.serial_no)
            .ok_or_else(|| StoreError::NotFound(transition.serial_no.to_string()))?;

        if record.status != transition.from {
            return Err(StoreError::StatusConflict {
                serial_no: transition.serial_no.to_string(),
                action: transition.action,
                expected: transition.from,
                actual: record.status,
            });
        }

        transition.apply_to(record);
        let committed = record.clone();

        let docs = inner
            .documents
            .entry(transition.serial_no.clone())
            .or_default();
        for blob in &transition.documents {
            docs.insert(blob.kind, blob.clone());
        }

        if let Some(entry) = transition.approval_entry() {
            inner.approval_log.push(entry);
        }
        if let Some(entry) = transition.chain_entry() {
            inner.chain_log.push(entry);
        }

        Ok(committed)
    }

    async fn get_documents(&self, serial_no: &SerialNumber) -> Result<Vec<DocumentBlob>> {
        let inner = self.read()?;
        Ok(inner
            .documents
            .get(serial_no)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_record_with_documents(
        &self,
        serial_no: &SerialNumber,
    ) -> Result<Option<(CredentialRecord, Vec<DocumentBlob>)>> {
        let inner = self.read()?;
        Ok(inner.records.get(serial_no).map(|(_, record)| {
            let docs = inner
                .documents
                .get(serial_no)
                .map(|docs| docs.values().cloned().collect())
                .unwrap_or_default();
            (record.clone(), docs)
        }))
    }

    async fn get_document(
        &self,
        serial_no: &SerialNumber,
        kind: DocumentKind,
    ) -> Result<Option<DocumentBlob>> {
        let inner = self.read()?;
        Ok(inner
            .documents
            .get(serial_no)
            .and_then(|docs| docs.get(&kind))
            .cloned())
    }

    async fn approval_log(&self, serial_no: &SerialNumber) -> Result<Vec<ApprovalLogEntry>> {
        let inner = self.read()?;
        Ok(inner
            .approval_log
            .iter()
            .filter(|e| &e.serial_no == serial_no)
            .cloned()
            .collect())
    }

    async fn chain_log(&self, serial_no: &SerialNumber) -> Result<Vec<ChainLogEntry>> {
        let inner = self.read()?;
        Ok(inner
            .chain_log
            .iter()
            .filter(|e| &e.serial_no == serial_no)
            .cloned()
            .collect())
    }
}
