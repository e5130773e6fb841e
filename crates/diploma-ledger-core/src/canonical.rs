//! Canonical text form of a diploma record.
//!
//! The canonical form is eleven `key=value` lines in a fixed order, joined by
//! `\n` with no trailing newline:
//!
//! ```text
//! serialNo=VB001
//! studentId=SV001
//! studentName=Nguyễn Văn A
//! birthDate=2000-01-15
//! major=Công nghệ thông tin
//! ranking=Giỏi
//! gpa=3.80
//! graduationYear=2024
//! portraitSha256=<64 hex>
//! diplomaSha256=<64 hex>
//! transcriptSha256=<64 hex>
//! ```
//!
//! Rendering is locale-independent: text is NFC-normalized and whitespace
//! collapsed, dates are `YYYY-MM-DD`, GPA has exactly two decimals, and
//! absent values render as the empty string.

use chrono::NaiveDate;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::crypto::{RecordHash, Sha256Digest};
use crate::record::{CredentialFields, DocumentDigests};
use crate::types::{Gpa, SerialNumber};

/// Line keys, in canonical order.
pub const CANONICAL_KEYS: [&str; 11] = [
    "serialNo",
    "studentId",
    "studentName",
    "birthDate",
    "major",
    "ranking",
    "gpa",
    "graduationYear",
    "portraitSha256",
    "diplomaSha256",
    "transcriptSha256",
];

/// The canonical text of one record. Recomputed on demand, never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.split('\n')
    }

    /// SHA-256 of the UTF-8 bytes.
    pub fn record_hash(&self) -> RecordHash {
        Sha256Digest::hash(self.as_bytes())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanonicalForm").field(&self.0).finish()
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the canonical form of a record.
pub fn canonical_form(
    serial_no: &SerialNumber,
    fields: &CredentialFields,
    digests: &DocumentDigests,
) -> CanonicalForm {
    let values: [String; 11] = [
        normalize_text(serial_no.as_str()),
        render_text(fields.student_id.as_deref()),
        render_text(fields.student_name.as_deref()),
        render_date(fields.birth_date),
        render_text(fields.major.as_deref()),
        render_text(fields.ranking.as_deref()),
        render_gpa(fields.gpa),
        render_year(fields.graduation_year),
        render_digest(digests.portrait),
        render_digest(digests.diploma),
        render_digest(digests.transcript),
    ];

    let mut out = String::with_capacity(512);
    for (i, (key, value)) in CANONICAL_KEYS.iter().zip(values.iter()).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    CanonicalForm(out)
}

/// Canonicalize and hash in one step.
pub fn record_hash(
    serial_no: &SerialNumber,
    fields: &CredentialFields,
    digests: &DocumentDigests,
) -> RecordHash {
    canonical_form(serial_no, fields, digests).record_hash()
}

/// NFC, trim, and collapse every whitespace run to one ASCII space.
pub fn normalize_text(s: &str) -> String {
    let composed: String = s.nfc().collect();
    composed
        .split(|c: char| c.is_whitespace() || c == '\u{feff}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_text(value: Option<&str>) -> String {
    value.map(normalize_text).unwrap_or_default()
}

pub fn render_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn render_gpa(value: Option<Gpa>) -> String {
    value.map(|g| g.to_string()).unwrap_or_default()
}

pub fn render_year(value: Option<i32>) -> String {
    value.map(|y| y.to_string()).unwrap_or_default()
}

fn render_digest(value: Option<Sha256Digest>) -> String {
    value.map(|d| d.to_hex()).unwrap_or_default()
}
