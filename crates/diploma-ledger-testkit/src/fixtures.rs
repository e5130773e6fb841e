//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use chrono::NaiveDate;
use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use diploma_ledger_chain::{
    EmbeddedConnector, EmbeddedLedger, EmbeddedLedgerConfig, Gateway, GatewayConfig,
};
use diploma_ledger_core::{
    CredentialFields, DocumentBlob, DocumentKind, Gpa, SerialNumber, SigningCredential,
};

/// Portrait bytes of the sample record.
pub const PORTRAIT_BYTES: &[u8] = b"fake-portrait-binary-content";
/// Diploma bytes of the sample record.
pub const DIPLOMA_BYTES: &[u8] = b"fake-diploma-binary-content";
/// Transcript bytes of the sample record.
pub const TRANSCRIPT_BYTES: &[u8] = b"fake-transcript-binary-content";

/// Default admitted MSP of the embedded ledger.
pub const ORG1_MSP: &str = "Org1MSP";

/// Serial number of the sample record.
pub fn sample_serial() -> SerialNumber {
    SerialNumber::new("VB001").expect("valid serial")
}

/// Fields of the sample record.
pub fn sample_fields() -> CredentialFields {
    CredentialFields {
        student_id: Some("SV001".into()),
        student_name: Some("Nguyễn Văn A".into()),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 15),
        major: Some("Công nghệ thông tin".into()),
        ranking: Some("Giỏi".into()),
        gpa: Some(Gpa::from_hundredths(380).expect("valid gpa")),
        graduation_year: Some(2024),
    }
}

/// The sample record as a loosely typed JSON submission.
pub fn sample_submission_json() -> Vec<u8> {
    serde_json::json!({
        "serialNo": "VB001",
        "studentId": "SV001",
        "studentName": "Nguyễn Văn A",
        "birthDate": "2000-01-15",
        "major": "Công nghệ thông tin",
        "ranking": "Giỏi",
        "gpa": "3.8",
        "graduationYear": 2024,
    })
    .to_string()
    .into_bytes()
}

/// The three documents of the sample record.
pub fn sample_documents() -> [DocumentBlob; 3] {
    [
        sample_document(DocumentKind::Portrait),
        sample_document(DocumentKind::Diploma),
        sample_document(DocumentKind::Transcript),
    ]
}

/// One document of the sample record.
pub fn sample_document(kind: DocumentKind) -> DocumentBlob {
    match kind {
        DocumentKind::Portrait => {
            DocumentBlob::new(kind, "portrait.png", "image/png", PORTRAIT_BYTES)
        }
        DocumentKind::Diploma => {
            DocumentBlob::new(kind, "diploma.pdf", "application/pdf", DIPLOMA_BYTES)
        }
        DocumentKind::Transcript => {
            DocumentBlob::new(kind, "transcript.pdf", "application/pdf", TRANSCRIPT_BYTES)
        }
    }
}

/// An issuer wallet: an Ed25519 key and the credential bundle built from it.
pub struct TestWallet {
    pub key: SigningKey,
    pub credential: SigningCredential,
}

impl TestWallet {
    /// Create a wallet with a random key.
    pub fn generate(msp_id: &str) -> Self {
        Self::from_key(SigningKey::generate(&mut OsRng), msp_id)
    }

    /// Create with a deterministic key from seed.
    pub fn with_seed(seed: [u8; 32], msp_id: &str) -> Self {
        Self::from_key(SigningKey::from_bytes(&seed), msp_id)
    }

    fn from_key(key: SigningKey, msp_id: &str) -> Self {
        let private_key = key
            .to_pkcs8_pem(Default::default())
            .expect("encode private key");
        let certificate = key
            .verifying_key()
            .to_public_key_pem(Default::default())
            .expect("encode public key");
        let credential = SigningCredential::new(msp_id, certificate, private_key.as_str())
            .expect("complete credential");
        Self { key, credential }
    }

    /// The wallet as a `{mspId, certificate, privateKey}` JSON bundle.
    pub fn bundle_json(&self) -> Vec<u8> {
        serde_json::json!({
            "mspId": self.credential.msp_id(),
            "certificate": self.credential.certificate(),
            "privateKey": self.credential.private_key(),
        })
        .to_string()
        .into_bytes()
    }
}

/// A test fixture with an issuer wallet and an embedded ledger.
pub struct TestFixture {
    pub wallet: TestWallet,
    pub ledger: EmbeddedLedger,
}

impl TestFixture {
    /// Create a new fixture with a random wallet admitted to the ledger.
    pub fn new() -> Self {
        Self {
            wallet: TestWallet::generate(ORG1_MSP),
            ledger: EmbeddedLedger::new(EmbeddedLedgerConfig::default()),
        }
    }

    /// Create with a deterministic wallet key from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            wallet: TestWallet::with_seed(seed, ORG1_MSP),
            ledger: EmbeddedLedger::new(EmbeddedLedgerConfig::default()),
        }
    }

    /// A gateway to this fixture's ledger.
    pub fn gateway(&self) -> Gateway<EmbeddedConnector> {
        Gateway::new(self.ledger.connector(), GatewayConfig::default())
    }

    /// The wallet's signing credential.
    pub fn credential(&self) -> &SigningCredential {
        &self.wallet.credential
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Wallets for several MSPs sharing one ledger.
pub fn multi_msp_wallets(msp_ids: &[&str]) -> Vec<TestWallet> {
    msp_ids.iter().map(|msp| TestWallet::generate(msp)).collect()
}
