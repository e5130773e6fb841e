//! The off-chain credential record and its attachments.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Sha256Digest;
use crate::lifecycle::CredentialStatus;
use crate::types::{DocumentKind, Gpa, SerialNumber};

/// Editable public fields of a diploma. Absent values canonicalize to "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFields {
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub major: Option<String>,
    pub ranking: Option<String>,
    pub gpa: Option<Gpa>,
    pub graduation_year: Option<i32>,
}

impl CredentialFields {
    /// Fields that must be present when a record is created.
    pub fn missing_required(&self) -> Option<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&self.student_id) {
            Some("studentId")
        } else if blank(&self.student_name) {
            Some("studentName")
        } else {
            None
        }
    }
}

/// Raw bytes of one attachment.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentBlob {
    pub kind: DocumentKind,
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}

impl DocumentBlob {
    pub fn new(
        kind: DocumentKind,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            kind,
            filename: filename.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn digest(&self) -> Sha256Digest {
        Sha256Digest::hash(&self.data)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for DocumentBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentBlob")
            .field("kind", &self.kind)
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Digests of the three attachments, as far as they exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDigests {
    pub portrait: Option<Sha256Digest>,
    pub diploma: Option<Sha256Digest>,
    pub transcript: Option<Sha256Digest>,
}

impl DocumentDigests {
    /// Hash whatever blobs are given. Later blobs of the same kind win.
    pub fn from_blobs<'a>(blobs: impl IntoIterator<Item = &'a DocumentBlob>) -> Self {
        let mut digests = Self::default();
        for blob in blobs {
            digests.set(blob.kind, blob.digest());
        }
        digests
    }

    pub fn get(&self, kind: DocumentKind) -> Option<Sha256Digest> {
        match kind {
            DocumentKind::Portrait => self.portrait,
            DocumentKind::Diploma => self.diploma,
            DocumentKind::Transcript => self.transcript,
        }
    }

    pub fn set(&mut self, kind: DocumentKind, digest: Sha256Digest) {
        let slot = match kind {
            DocumentKind::Portrait => &mut self.portrait,
            DocumentKind::Diploma => &mut self.diploma,
            DocumentKind::Transcript => &mut self.transcript,
        };
        *slot = Some(digest);
    }

    /// Kinds without a digest, in canonical order.
    pub fn missing(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// The off-chain source of truth for one diploma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub serial_no: SerialNumber,
    #[serde(flatten)]
    pub fields: CredentialFields,
    pub status: CredentialStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub issued_by: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// A new `PENDING` record.
    pub fn new(
        serial_no: SerialNumber,
        fields: CredentialFields,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            serial_no,
            fields,
            status: CredentialStatus::INITIAL,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
            approved_by: None,
            approved_at: None,
            issued_by: None,
            issued_at: None,
            revoked_by: None,
            revoked_at: None,
        }
    }
}
