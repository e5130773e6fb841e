//! The Registry: unified API for diploma records.
//!
//! The Registry brings together off-chain storage, the lifecycle state
//! machine and the ledger gateway. Every mutation of a serial runs under that
//! serial's lock, from the status read until the new status is committed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use diploma_ledger_chain::{LedgerEntry, LedgerGateway};
use diploma_ledger_core::{
    allowed_actions, canonical_form, next_status, plan_issue, CanonicalForm, CredentialFields,
    CredentialRecord, CredentialStatus, DocumentBlob, DocumentDigests, DocumentKind,
    LifecycleAction, LifecycleError, RawSubmission, RecordHash, SerialNumber, SigningCredential,
    ValidationError,
};
use diploma_ledger_store::{
    ApprovalLogEntry, ChainLogEntry, ChainReceipt, RecordFilter, RecordStore, Transition,
};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::locks::SerialLocks;
use crate::verify::{ConsistencyVerifier, VerifyReport};

/// A credential submitted for creation.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub serial_no: SerialNumber,
    pub fields: CredentialFields,
    pub documents: Vec<DocumentBlob>,
}

impl NewCredential {
    pub fn new(serial_no: SerialNumber, fields: CredentialFields) -> Self {
        Self {
            serial_no,
            fields,
            documents: Vec::new(),
        }
    }

    /// Attach a document. A later document of the same kind replaces an earlier one.
    pub fn document(mut self, blob: DocumentBlob) -> Self {
        self.documents.push(blob);
        self
    }

    /// Parse a loosely typed JSON submission.
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, ValidationError> {
        let (serial_no, fields) = RawSubmission::from_json(bytes)?.parse()?;
        Ok(Self::new(serial_no, fields))
    }
}

/// A recomputed record hash and the text it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHashReport {
    pub record_hash: RecordHash,
    pub canonical: CanonicalForm,
}

/// Outcome of a ledger write: the committed off-chain record and the ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerWrite {
    pub record: CredentialRecord,
    pub entry: LedgerEntry,
}

/// The main Registry struct.
///
/// Provides a unified API for:
/// - Creating and editing diploma records and their documents
/// - Moving records through the approval workflow
/// - Issuing and revoking diplomas on the ledger
/// - Verifying off-chain records against the ledger
pub struct Registry<S: RecordStore, G: LedgerGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
    locks: SerialLocks,
    config: RegistryConfig,
}

impl<S: RecordStore, G: LedgerGateway> Registry<S, G> {
    /// Create a new registry.
    pub fn new(store: S, gateway: G, config: RegistryConfig) -> Self {
        Self {
            store: Arc::new(store),
            gateway: Arc::new(gateway),
            locks: SerialLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// A verifier sharing this registry's store and gateway.
    pub fn verifier(&self) -> ConsistencyVerifier<S, G> {
        ConsistencyVerifier::new(Arc::clone(&self.store), Arc::clone(&self.gateway))
    }

    /// Parse a signing credential bundle, enforcing the size limit first.
    pub fn load_credential(&self, bytes: &[u8]) -> Result<SigningCredential> {
        Ok(SigningCredential::from_json_limited(
            bytes,
            self.config.limits.max_credential_bytes,
        )?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a `PENDING` record with any documents supplied.
    #[instrument(skip_all, fields(serial = %new.serial_no, actor = %actor))]
    pub async fn create(&self, new: NewCredential, actor: &str) -> Result<CredentialRecord> {
        check_required(&new.fields)?;

        let mut documents = BTreeMap::new();
        for blob in new.documents {
            self.config.limits.check_document(&blob)?;
            documents.insert(blob.kind, blob);
        }
        let documents: Vec<DocumentBlob> = documents.into_values().collect();

        let record = CredentialRecord::new(new.serial_no, new.fields, actor, Utc::now());
        self.store.insert_record(&record, &documents).await?;

        info!(documents = documents.len(), "diploma created");
        Ok(record)
    }

    /// Replace the editable fields. Editing a `REJECTED` record returns it to `PENDING`.
    #[instrument(skip(self, fields), fields(serial = %serial_no))]
    pub async fn edit(
        &self,
        serial_no: &SerialNumber,
        fields: CredentialFields,
        actor: &str,
    ) -> Result<CredentialRecord> {
        check_required(&fields)?;

        let _guard = self.locks.acquire(serial_no).await;
        let record = self.load(serial_no).await?;
        let to = self.plan(&record, LifecycleAction::Edit)?;

        let transition = Transition::new(
            serial_no.clone(),
            LifecycleAction::Edit,
            record.status,
            to,
            actor,
            Utc::now(),
        )
        .fields(fields);
        self.commit(&transition).await
    }

    /// Attach or replace the document of `blob.kind`. This is an edit.
    #[instrument(skip(self, blob), fields(serial = %serial_no, kind = %blob.kind, size = blob.size()))]
    pub async fn attach_document(
        &self,
        serial_no: &SerialNumber,
        blob: DocumentBlob,
        actor: &str,
    ) -> Result<CredentialRecord> {
        self.config.limits.check_document(&blob)?;

        let _guard = self.locks.acquire(serial_no).await;
        let record = self.load(serial_no).await?;
        let to = self.plan(&record, LifecycleAction::Edit)?;

        let transition = Transition::new(
            serial_no.clone(),
            LifecycleAction::Edit,
            record.status,
            to,
            actor,
            Utc::now(),
        )
        .document(blob);
        self.commit(&transition).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Workflow Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// `PENDING -> APPROVED`.
    pub async fn approve(
        &self,
        serial_no: &SerialNumber,
        actor: &str,
        note: Option<String>,
    ) -> Result<CredentialRecord> {
        self.transition(serial_no, LifecycleAction::Approve, actor, note)
            .await
    }

    /// `PENDING -> REJECTED`.
    pub async fn reject(
        &self,
        serial_no: &SerialNumber,
        actor: &str,
        note: Option<String>,
    ) -> Result<CredentialRecord> {
        self.transition(serial_no, LifecycleAction::Reject, actor, note)
            .await
    }

    /// `REJECTED -> PENDING`.
    pub async fn resubmit(
        &self,
        serial_no: &SerialNumber,
        actor: &str,
        note: Option<String>,
    ) -> Result<CredentialRecord> {
        self.transition(serial_no, LifecycleAction::Resubmit, actor, note)
            .await
    }

    /// `APPROVED -> REJECTED`, declining to issue.
    pub async fn reject_issue(
        &self,
        serial_no: &SerialNumber,
        actor: &str,
        note: Option<String>,
    ) -> Result<CredentialRecord> {
        self.transition(serial_no, LifecycleAction::RejectIssue, actor, note)
            .await
    }

    #[instrument(skip(self, note), fields(serial = %serial_no, action = %action))]
    async fn transition(
        &self,
        serial_no: &SerialNumber,
        action: LifecycleAction,
        actor: &str,
        note: Option<String>,
    ) -> Result<CredentialRecord> {
        let _guard = self.locks.acquire(serial_no).await;
        let record = self.load(serial_no).await?;
        let to = self.plan(&record, action)?;

        let transition = Transition::new(
            serial_no.clone(),
            action,
            record.status,
            to,
            actor,
            Utc::now(),
        )
        .note(note.filter(|n| !n.trim().is_empty()));
        self.commit(&transition).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ledger Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue an `APPROVED` record on the ledger, then mark it `ISSUED`.
    ///
    /// The record hash is recomputed from the current fields and documents.
    /// The ledger call is made once; if it fails the record is unchanged.
    #[instrument(skip(self, credential), fields(serial = %serial_no, msp = %credential.msp_id()))]
    pub async fn issue(
        &self,
        serial_no: &SerialNumber,
        credential: &SigningCredential,
        actor: &str,
    ) -> Result<LedgerWrite> {
        let _guard = self.locks.acquire(serial_no).await;
        let (record, documents) = self.load_with_documents(serial_no).await?;
        let digests = DocumentDigests::from_blobs(&documents);
        let to = plan_issue(record.status, &digests).map_err(|e| {
            warn!(from = %record.status, error = %e, "issue rejected");
            e
        })?;

        let hash = canonical_form(&record.serial_no, &record.fields, &digests).record_hash();
        let entry = self
            .gateway
            .issue(serial_no, &record.fields, &hash, credential)
            .await?;

        let transition = Transition::new(
            serial_no.clone(),
            LifecycleAction::Issue,
            record.status,
            to,
            actor,
            Utc::now(),
        )
        .chain(ChainReceipt {
            tx_id: entry.tx_id.clone(),
            record_hash: Some(entry.record_hash),
            onchain_status: entry.status.to_string(),
        });
        let record = self.commit_ledger_write(&transition, &entry).await?;
        Ok(LedgerWrite { record, entry })
    }

    /// Revoke an `ISSUED` record on the ledger, then mark it `REVOKED`.
    ///
    /// Reads the ledger entry first so the chain log keeps the hash that was
    /// revoked.
    #[instrument(skip(self, credential), fields(serial = %serial_no, msp = %credential.msp_id()))]
    pub async fn revoke(
        &self,
        serial_no: &SerialNumber,
        credential: &SigningCredential,
        actor: &str,
    ) -> Result<LedgerWrite> {
        let _guard = self.locks.acquire(serial_no).await;
        let record = self.load(serial_no).await?;
        let to = self.plan(&record, LifecycleAction::Revoke)?;

        let current = self.gateway.read(serial_no).await?;
        let revoked_at = Utc::now();
        let entry = self
            .gateway
            .revoke(serial_no, revoked_at, credential)
            .await?;

        let transition = Transition::new(
            serial_no.clone(),
            LifecycleAction::Revoke,
            record.status,
            to,
            actor,
            revoked_at,
        )
        .chain(ChainReceipt {
            tx_id: entry.tx_id.clone(),
            record_hash: Some(current.record_hash),
            onchain_status: entry.status.to_string(),
        });
        let record = self.commit_ledger_write(&transition, &entry).await?;
        Ok(LedgerWrite { record, entry })
    }

    /// Compare the off-chain record with its ledger entry.
    pub async fn verify(&self, serial_no: &SerialNumber) -> Result<VerifyReport> {
        self.verifier().verify(serial_no).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a record by serial number.
    pub async fn get(&self, serial_no: &SerialNumber) -> Result<CredentialRecord> {
        self.load(serial_no).await
    }

    /// List records newest first, at most `list_limit` of them.
    pub async fn list(&self, filter: RecordFilter) -> Result<Vec<CredentialRecord>> {
        let filter = RecordFilter {
            limit: filter.limit.min(self.config.list_limit),
            ..filter
        };
        Ok(self.store.list_records(&filter).await?)
    }

    /// A record's document of one kind, if attached.
    pub async fn document(
        &self,
        serial_no: &SerialNumber,
        kind: DocumentKind,
    ) -> Result<Option<DocumentBlob>> {
        self.load(serial_no).await?;
        Ok(self.store.get_document(serial_no, kind).await?)
    }

    /// Recompute the record hash from current off-chain state.
    ///
    /// Fails while any of the three documents is missing.
    pub async fn record_hash(&self, serial_no: &SerialNumber) -> Result<RecordHashReport> {
        let (record, documents) = self.load_with_documents(serial_no).await?;
        let digests = DocumentDigests::from_blobs(&documents);
        if !digests.is_complete() {
            return Err(LifecycleError::MissingDocuments {
                missing: digests.missing(),
            }
            .into());
        }
        let canonical = canonical_form(&record.serial_no, &record.fields, &digests);
        Ok(RecordHashReport {
            record_hash: canonical.record_hash(),
            canonical,
        })
    }

    /// Actions currently allowed on a record.
    pub async fn actions(&self, serial_no: &SerialNumber) -> Result<Vec<LifecycleAction>> {
        Ok(allowed_actions(self.load(serial_no).await?.status))
    }

    pub async fn approval_log(&self, serial_no: &SerialNumber) -> Result<Vec<ApprovalLogEntry>> {
        Ok(self.store.approval_log(serial_no).await?)
    }

    pub async fn chain_log(&self, serial_no: &SerialNumber) -> Result<Vec<ChainLogEntry>> {
        Ok(self.store.chain_log(serial_no).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn load(&self, serial_no: &SerialNumber) -> Result<CredentialRecord> {
        self.store
            .get_record(serial_no)
            .await?
            .ok_or_else(|| RegistryError::NotFound(serial_no.clone()))
    }

    async fn load_with_documents(
        &self,
        serial_no: &SerialNumber,
    ) -> Result<(CredentialRecord, Vec<DocumentBlob>)> {
        self.store
            .get_record_with_documents(serial_no)
            .await?
            .ok_or_else(|| RegistryError::NotFound(serial_no.clone()))
    }

    fn plan(&self, record: &CredentialRecord, action: LifecycleAction) -> Result<CredentialStatus> {
        next_status(record.status, action).map_err(|e| {
            warn!(from = %record.status, action = %action, "transition rejected");
            e.into()
        })
    }

    async fn commit(&self, transition: &Transition) -> Result<CredentialRecord> {
        let record = self.store.apply_transition(transition).await?;
        info!(
            from = %transition.from,
            to = %transition.to,
            action = %transition.action,
            actor = %transition.actor,
            "transition committed"
        );
        Ok(record)
    }

    async fn commit_ledger_write(
        &self,
        transition: &Transition,
        entry: &LedgerEntry,
    ) -> Result<CredentialRecord> {
        match self.store.apply_transition(transition).await {
            Ok(record) => {
                info!(
                    from = %transition.from,
                    to = %transition.to,
                    tx_id = %entry.tx_id,
                    "ledger write committed"
                );
                Ok(record)
            }
            Err(e) => {
                error!(
                    tx_id = %entry.tx_id,
                    onchain_status = %entry.status,
                    offchain_status = %transition.from,
                    error = %e,
                    "ledger write committed but off-chain commit failed; records diverge"
                );
                Err(e.into())
            }
        }
    }
}

fn check_required(fields: &CredentialFields) -> std::result::Result<(), ValidationError> {
    match fields.missing_required() {
        Some(name) => Err(ValidationError::MissingField(name)),
        None => Ok(()),
    }
}
