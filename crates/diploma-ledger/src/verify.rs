//! Consistency verification between off-chain records and the ledger.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use diploma_ledger_chain::{LedgerEntry, LedgerGateway};
use diploma_ledger_core::{
    record_hash, CredentialStatus, DocumentDigests, RecordHash, SerialNumber,
};
use diploma_ledger_store::RecordStore;

use crate::error::Result;

/// What the off-chain store says about a serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffchainView {
    pub status: CredentialStatus,
    /// Recomputed from current fields and documents; absent while any
    /// document is missing.
    pub record_hash: Option<RecordHash>,
}

/// Result of comparing off-chain state with the ledger.
///
/// A hash mismatch is reported here, never raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    pub serial_no: SerialNumber,
    pub offchain: Option<OffchainView>,
    pub onchain: Option<LedgerEntry>,
    /// Both hashes exist and are equal.
    pub matches: bool,
}

impl VerifyReport {
    pub fn offchain_hash(&self) -> Option<RecordHash> {
        self.offchain.as_ref().and_then(|v| v.record_hash)
    }

    pub fn onchain_hash(&self) -> Option<RecordHash> {
        self.onchain.as_ref().map(|e| e.record_hash)
    }

    /// Both hashes exist and differ.
    pub fn is_mismatch(&self) -> bool {
        matches!((self.offchain_hash(), self.onchain_hash()), (Some(a), Some(b)) if a != b)
    }
}

/// Recomputes record hashes and compares them with the ledger.
///
/// Read-only: takes no serial lock and never changes lifecycle state.
pub struct ConsistencyVerifier<S: RecordStore, G: LedgerGateway> {
    store: Arc<S>,
    gateway: Arc<G>,
}

impl<S: RecordStore, G: LedgerGateway> Clone for ConsistencyVerifier<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<S: RecordStore, G: LedgerGateway> ConsistencyVerifier<S, G> {
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Compare the recomputed off-chain hash with the ledger entry.
    ///
    /// An unknown off-chain serial and an absent ledger entry are reported as
    /// `None`. Ledger transport failures are returned as errors.
    #[instrument(skip(self), fields(serial = %serial_no))]
    pub async fn verify(&self, serial_no: &SerialNumber) -> Result<VerifyReport> {
        let offchain = self
            .store
            .get_record_with_documents(serial_no)
            .await?
            .map(|(record, documents)| {
                let digests = DocumentDigests::from_blobs(&documents);
                OffchainView {
                    status: record.status,
                    record_hash: digests
                        .is_complete()
                        .then(|| record_hash(&record.serial_no, &record.fields, &digests)),
                }
            });

        let onchain = match self.gateway.read(serial_no).await {
            Ok(entry) => Some(entry),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };

        let offchain_hash = offchain.as_ref().and_then(|v| v.record_hash);
        let onchain_hash = onchain.as_ref().map(|e| e.record_hash);
        let matches = matches!((offchain_hash, onchain_hash), (Some(a), Some(b)) if a == b);

        let report = VerifyReport {
            serial_no: serial_no.clone(),
            offchain,
            onchain,
            matches,
        };
        if report.is_mismatch() {
            warn!(
                offchain = ?report.offchain_hash(),
                onchain = ?report.onchain_hash(),
                "record hash differs from ledger"
            );
        } else {
            info!(matches, "verified");
        }
        Ok(report)
    }
}
