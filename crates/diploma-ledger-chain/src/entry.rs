//! Ledger data shapes: the committed entry and the issue payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use diploma_ledger_core::canonical::{render_date, render_gpa, render_text, render_year};
use diploma_ledger_core::{CredentialFields, RecordHash};

/// Status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Issued,
    Revoked,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "ISSUED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential as committed on the ledger, keyed by serial number.
///
/// Created by `IssueDiploma`, changed only by `RevokeDiploma`, never deleted.
/// Public fields hold their canonical renderings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub serial_no: String,
    pub student_id: String,
    pub student_name: String,
    pub birth_date: String,
    pub major: String,
    pub ranking: String,
    pub gpa: String,
    pub graduation_year: String,
    pub record_hash: RecordHash,
    pub status: LedgerStatus,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Transaction that last wrote this entry.
    pub tx_id: String,
}

impl LedgerEntry {
    pub fn to_json(&self) -> String {
        // A struct of strings and timestamps always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The `jsonRecord` argument of `IssueDiploma`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePayload {
    pub student_id: String,
    pub student_name: String,
    pub birth_date: String,
    pub major: String,
    pub ranking: String,
    pub gpa: String,
    pub graduation_year: String,
    pub record_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
}

impl IssuePayload {
    /// Render typed fields the same way the canonical form does.
    pub fn new(fields: &CredentialFields, record_hash: &RecordHash) -> Self {
        Self {
            student_id: render_text(fields.student_id.as_deref()),
            student_name: render_text(fields.student_name.as_deref()),
            birth_date: render_date(fields.birth_date),
            major: render_text(fields.major.as_deref()),
            ranking: render_text(fields.ranking.as_deref()),
            gpa: render_gpa(fields.gpa),
            graduation_year: render_year(fields.graduation_year),
            record_hash: record_hash.to_hex(),
            issued_at: None,
        }
    }

    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = Some(at.to_rfc3339());
        self
    }
}
