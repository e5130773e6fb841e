//! End-to-end workflow tests: create, approve, issue, verify, revoke.

use anyhow::Result;
use chrono::Utc;

use diploma_ledger::chain::{EmbeddedConnector, Gateway, LedgerError};
use diploma_ledger::core::{DocumentKind, LifecycleError};
use diploma_ledger::store::{MemoryStore, RecordFilter, SqliteStore, Transition};
use diploma_ledger::{
    CredentialStatus, ErrorClass, LedgerStatus, LifecycleAction, NewCredential, RecordStore,
    Registry, RegistryConfig, RegistryError,
};
use diploma_ledger_testkit::fixtures::{
    multi_msp_wallets, sample_document, sample_documents, sample_fields, sample_serial, TestFixture,
    ORG1_MSP,
};

const SAMPLE_HASH: &str = "436367fb1824ee3a4a8a8679ee58a70d69f3d5f39dd6f95b909f9ba20124ebc4";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn registry<S: RecordStore>(store: S, fixture: &TestFixture) -> Registry<S, Gateway<EmbeddedConnector>> {
    Registry::new(store, fixture.gateway(), RegistryConfig::default())
}

fn sample_credential() -> NewCredential {
    sample_documents()
        .into_iter()
        .fold(NewCredential::new(sample_serial(), sample_fields()), |new, blob| {
            new.document(blob)
        })
}

async fn full_lifecycle<S: RecordStore>(store: S) -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let registry = registry(store, &fixture);
    let serial = sample_serial();

    let record = registry.create(sample_credential(), "officer").await?;
    assert_eq!(record.status, CredentialStatus::Pending);
    assert_eq!(
        registry.actions(&serial).await?,
        vec![
            LifecycleAction::Approve,
            LifecycleAction::Reject,
            LifecycleAction::Edit
        ]
    );

    let approved = registry.approve(&serial, "head", Some("ok".into())).await?;
    assert_eq!(approved.status, CredentialStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("head"));

    let issued = registry.issue(&serial, fixture.credential(), "rector").await?;
    assert_eq!(issued.record.status, CredentialStatus::Issued);
    assert_eq!(issued.record.issued_by.as_deref(), Some("rector"));
    assert_eq!(issued.entry.status, LedgerStatus::Issued);
    assert_eq!(issued.entry.record_hash.to_hex(), SAMPLE_HASH);
    assert_eq!(issued.entry.student_name, "Nguyễn Văn A");
    assert_eq!(issued.entry.gpa, "3.80");
    assert_eq!(issued.entry.graduation_year, "2024");

    let report = registry.verify(&serial).await?;
    assert!(report.matches);
    assert!(!report.is_mismatch());
    assert_eq!(report.offchain_hash(), report.onchain_hash());

    let revoked = registry.revoke(&serial, fixture.credential(), "rector").await?;
    assert_eq!(revoked.record.status, CredentialStatus::Revoked);
    assert_eq!(revoked.entry.status, LedgerStatus::Revoked);
    assert!(revoked.entry.revoked_at.is_some());
    assert!(registry.actions(&serial).await?.is_empty());

    // Ledger writes go to the chain log only.
    let approvals = registry.approval_log(&serial).await?;
    let steps: Vec<_> = approvals.iter().map(|e| (e.action, e.from, e.to)).collect();
    assert_eq!(
        steps,
        vec![(
            LifecycleAction::Approve,
            CredentialStatus::Pending,
            CredentialStatus::Approved
        )]
    );
    assert_eq!(approvals[0].note.as_deref(), Some("ok"));

    let chain = registry.chain_log(&serial).await?;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].action, LifecycleAction::Issue);
    assert_eq!(chain[0].tx_id, issued.entry.tx_id);
    assert_eq!(chain[0].onchain_status, "ISSUED");
    assert_eq!(chain[1].action, LifecycleAction::Revoke);
    assert_eq!(chain[1].tx_id, revoked.entry.tx_id);
    assert_eq!(chain[1].onchain_status, "REVOKED");
    assert!(chain
        .iter()
        .all(|e| e.record_hash.map(|h| h.to_hex()).as_deref() == Some(SAMPLE_HASH)));

    // Verification still compares hashes after revocation.
    let report = registry.verify(&serial).await?;
    assert!(report.matches);
    assert_eq!(
        report.onchain.as_ref().map(|e| e.status),
        Some(LedgerStatus::Revoked)
    );
    assert_eq!(fixture.ledger.open_channels(), 0);
    Ok(())
}

#[tokio::test]
async fn test_full_lifecycle_memory() -> Result<()> {
    full_lifecycle(MemoryStore::new()).await
}

#[tokio::test]
async fn test_full_lifecycle_sqlite() -> Result<()> {
    let dir = tempfile::tempdir()?;
    full_lifecycle(SqliteStore::open(dir.path().join("diplomas.db"))?).await
}

#[tokio::test]
async fn test_reject_edit_resubmit() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();

    registry.create(sample_credential(), "officer").await?;
    registry
        .reject(&serial, "head", Some("wrong major".into()))
        .await?;

    let mut fields = sample_fields();
    fields.major = Some("Khoa học máy tính".into());
    let edited = registry.edit(&serial, fields.clone(), "officer").await?;
    assert_eq!(edited.status, CredentialStatus::Pending);
    assert_eq!(edited.fields, fields);

    registry.reject(&serial, "head", None).await?;
    let resubmitted = registry.resubmit(&serial, "officer", None).await?;
    assert_eq!(resubmitted.status, CredentialStatus::Pending);

    registry.approve(&serial, "head", None).await?;
    let declined = registry
        .reject_issue(&serial, "rector", Some("hold".into()))
        .await?;
    assert_eq!(declined.status, CredentialStatus::Rejected);

    // Nothing reached the ledger.
    assert!(fixture.ledger.is_empty().await);
    assert!(registry.chain_log(&serial).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_issue_requires_approval() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;

    let err = registry
        .issue(&serial, fixture.credential(), "rector")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Lifecycle(LifecycleError::InvalidTransition { .. })
    ));
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Pending);
    assert!(fixture.ledger.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_revoke_requires_issued() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;

    let err = registry
        .revoke(&serial, fixture.credential(), "rector")
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Approved);
    Ok(())
}

#[tokio::test]
async fn test_issue_requires_all_documents() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();

    let new = NewCredential::new(serial.clone(), sample_fields())
        .document(sample_document(DocumentKind::Portrait));
    registry.create(new, "officer").await?;
    registry.approve(&serial, "head", None).await?;

    let err = registry
        .issue(&serial, fixture.credential(), "rector")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Lifecycle(LifecycleError::GuardViolation { .. })
    ));
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Approved);

    let err = registry.record_hash(&serial).await.unwrap_err();
    match err {
        RegistryError::Lifecycle(LifecycleError::MissingDocuments { missing }) => {
            assert_eq!(missing, vec![DocumentKind::Diploma, DocumentKind::Transcript]);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Documents cannot be attached once approved.
    let err = registry
        .attach_document(&serial, sample_document(DocumentKind::Diploma), "officer")
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    Ok(())
}

#[tokio::test]
async fn test_attach_documents_then_issue() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();

    registry
        .create(NewCredential::new(serial.clone(), sample_fields()), "officer")
        .await?;
    for blob in sample_documents() {
        registry.attach_document(&serial, blob, "officer").await?;
    }
    registry.approve(&serial, "head", None).await?;

    let issued = registry.issue(&serial, fixture.credential(), "rector").await?;
    assert_eq!(issued.entry.record_hash.to_hex(), SAMPLE_HASH);
    Ok(())
}

#[tokio::test]
async fn test_verify_detects_offchain_tampering() -> Result<()> {
    init_tracing();
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();

    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;
    registry.issue(&serial, fixture.credential(), "rector").await?;

    // A direct write to the store, bypassing the workflow.
    let mut forged = sample_document(DocumentKind::Diploma);
    forged.data = b"forged-diploma".to_vec().into();
    let tamper = Transition::new(
        serial.clone(),
        LifecycleAction::Edit,
        CredentialStatus::Issued,
        CredentialStatus::Issued,
        "intruder",
        Utc::now(),
    )
    .document(forged);
    registry.store().apply_transition(&tamper).await?;

    let report = registry.verify(&serial).await?;
    assert!(!report.matches);
    assert!(report.is_mismatch());
    assert_eq!(
        report.onchain_hash().map(|h| h.to_hex()).as_deref(),
        Some(SAMPLE_HASH)
    );
    // Verification never changes state.
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Issued);
    Ok(())
}

#[tokio::test]
async fn test_verify_unknown_and_unissued() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();

    let report = registry.verify(&serial).await?;
    assert!(report.offchain.is_none());
    assert!(report.onchain.is_none());
    assert!(!report.matches);

    registry.create(sample_credential(), "officer").await?;
    let report = registry.verify(&serial).await?;
    let offchain = report.offchain.as_ref().expect("record exists");
    assert_eq!(offchain.status, CredentialStatus::Pending);
    assert_eq!(
        offchain.record_hash.map(|h| h.to_hex()).as_deref(),
        Some(SAMPLE_HASH)
    );
    assert!(report.onchain.is_none());
    assert!(!report.matches);
    assert!(!report.is_mismatch());
    Ok(())
}

#[tokio::test]
async fn test_unavailable_ledger_leaves_status() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;

    fixture.ledger.set_available(false);
    let err = registry
        .issue(&serial, fixture.credential(), "rector")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Ledger(LedgerError::Unavailable(_))));
    assert_eq!(err.class(), ErrorClass::Transport);
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Approved);
    assert!(registry.chain_log(&serial).await?.is_empty());

    let err = registry.verify(&serial).await.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Transport);

    fixture.ledger.set_available(true);
    let issued = registry.issue(&serial, fixture.credential(), "rector").await?;
    assert_eq!(issued.record.status, CredentialStatus::Issued);
    Ok(())
}

#[tokio::test]
async fn test_unadmitted_msp_rejected() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;

    let wallets = multi_msp_wallets(&[ORG1_MSP, "Org9MSP"]);
    let err = registry
        .issue(&serial, &wallets[1].credential, "rector")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Ledger(LedgerError::CredentialRejected(_))
    ));
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Approved);
    assert!(fixture.ledger.is_empty().await);

    // A fresh key from an admitted MSP is accepted.
    let issued = registry.issue(&serial, &wallets[0].credential, "rector").await?;
    assert_eq!(issued.record.status, CredentialStatus::Issued);
    Ok(())
}

#[tokio::test]
async fn test_credential_bundle_round_trip() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;

    let credential = registry.load_credential(&fixture.wallet.bundle_json())?;
    let issued = registry.issue(&serial, &credential, "rector").await?;
    assert_eq!(issued.record.status, CredentialStatus::Issued);

    let err = registry.load_credential(b"{\"mspId\":\"Org1MSP\"}").unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    Ok(())
}

#[tokio::test]
async fn test_ledger_entry_already_exists() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    let serial = sample_serial();
    registry.create(sample_credential(), "officer").await?;
    registry.approve(&serial, "head", None).await?;

    // Someone else issued this serial on the ledger first.
    let other = Registry::new(MemoryStore::new(), fixture.gateway(), RegistryConfig::default());
    other.create(sample_credential(), "officer").await?;
    other.approve(&serial, "head", None).await?;
    other.issue(&serial, fixture.credential(), "rector").await?;

    let err = registry
        .issue(&serial, fixture.credential(), "rector")
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert_eq!(registry.get(&serial).await?.status, CredentialStatus::Approved);
    Ok(())
}

#[tokio::test]
async fn test_list_and_upload_limits() -> Result<()> {
    let fixture = TestFixture::new();
    let registry = registry(MemoryStore::new(), &fixture);
    registry.create(sample_credential(), "officer").await?;

    let listed = registry
        .list(RecordFilter {
            query: Some("nguyễn".into()),
            ..Default::default()
        })
        .await?;
    assert_eq!(listed.len(), 1);

    let listed = registry
        .list(RecordFilter {
            status: Some(CredentialStatus::Issued),
            ..Default::default()
        })
        .await?;
    assert!(listed.is_empty());

    let mut exe = sample_document(DocumentKind::Portrait);
    exe.mime_type = "application/x-msdownload".into();
    let err = registry
        .attach_document(&sample_serial(), exe, "officer")
        .await
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    Ok(())
}
