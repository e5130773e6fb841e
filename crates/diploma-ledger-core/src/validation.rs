//! Typed parsing of loosely-typed input.
//!
//! Submissions arrive as JSON where numbers and strings are used
//! interchangeably (`"gpa": "3.8"` or `"gpa": 3.8`). Everything is turned into
//! typed values here so nothing downstream inspects raw JSON.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::crypto::{RecordHash, Sha256Digest};
use crate::error::ValidationError;
use crate::record::CredentialFields;
use crate::types::{Gpa, SerialNumber};

/// A JSON scalar that may be either a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseValue {
    Text(String),
    Number(serde_json::Number),
}

impl LooseValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Credential fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCredentialFields {
    pub student_id: Option<LooseValue>,
    pub student_name: Option<LooseValue>,
    pub birth_date: Option<LooseValue>,
    pub major: Option<LooseValue>,
    pub ranking: Option<LooseValue>,
    pub gpa: Option<LooseValue>,
    pub graduation_year: Option<LooseValue>,
}

impl RawCredentialFields {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(bytes).map_err(|e| ValidationError::InvalidJson(e.to_string()))
    }
}

impl TryFrom<RawCredentialFields> for CredentialFields {
    type Error = ValidationError;

    fn try_from(raw: RawCredentialFields) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: parse_text(raw.student_id),
            student_name: parse_text(raw.student_name),
            birth_date: raw.birth_date.map(parse_date).transpose()?.flatten(),
            major: parse_text(raw.major),
            ranking: parse_text(raw.ranking),
            gpa: raw.gpa.map(parse_gpa).transpose()?.flatten(),
            graduation_year: raw.graduation_year.map(parse_year).transpose()?.flatten(),
        })
    }
}

/// A submission with its serial number, as accepted by record creation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(default)]
    pub serial_no: Option<LooseValue>,
    #[serde(flatten)]
    pub fields: RawCredentialFields,
}

impl RawSubmission {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(bytes).map_err(|e| ValidationError::InvalidJson(e.to_string()))
    }

    /// Split into a validated serial number and typed fields.
    pub fn parse(self) -> Result<(SerialNumber, CredentialFields), ValidationError> {
        let serial = self
            .serial_no
            .map(LooseValue::into_text)
            .ok_or(ValidationError::MissingField("serialNo"))?;
        let serial = SerialNumber::new(&serial)?;
        Ok((serial, CredentialFields::try_from(self.fields)?))
    }
}

/// Trimmed text; blank becomes absent.
fn parse_text(value: Option<LooseValue>) -> Option<String> {
    let text = value?.into_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `YYYY-MM-DD`, or a datetime whose first ten characters are one.
fn parse_date(value: LooseValue) -> Result<Option<NaiveDate>, ValidationError> {
    let text = match value {
        LooseValue::Text(s) => s,
        LooseValue::Number(n) => return Err(ValidationError::InvalidDate(n.to_string())),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

fn parse_gpa(value: LooseValue) -> Result<Option<Gpa>, ValidationError> {
    match value {
        LooseValue::Text(s) if s.trim().is_empty() => Ok(None),
        LooseValue::Text(s) => Gpa::parse(&s).map(Some),
        // The number's own decimal text, so `1.005` and `"1.005"` round alike.
        LooseValue::Number(n) => {
            let text = n.to_string();
            if text.contains(['e', 'E']) {
                let f = n
                    .as_f64()
                    .ok_or_else(|| ValidationError::InvalidGpa(text.clone()))?;
                Gpa::from_f64(f).map(Some)
            } else {
                Gpa::parse(&text).map(Some)
            }
        }
    }
}

fn parse_year(value: LooseValue) -> Result<Option<i32>, ValidationError> {
    let text = match value {
        LooseValue::Text(s) if s.trim().is_empty() => return Ok(None),
        LooseValue::Text(s) => s.trim().to_string(),
        LooseValue::Number(n) => n.to_string(),
    };
    let invalid = || ValidationError::InvalidYear(text.clone());

    if let Ok(year) = text.parse::<i32>() {
        return Ok(Some(year));
    }
    // Integral decimals such as `2024.0` are accepted.
    let f: f64 = text.parse().map_err(|_| invalid())?;
    if f.fract() != 0.0 || f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
        return Err(invalid());
    }
    Ok(Some(f as i32))
}

/// Validate a record hash as written by a client: trimmed, case-insensitive,
/// exactly 64 hex characters.
pub fn parse_record_hash(raw: &str) -> Result<RecordHash, ValidationError> {
    let s = raw.trim().to_ascii_lowercase();
    if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidRecordHash);
    }
    Sha256Digest::from_hex(&s).map_err(|_| ValidationError::InvalidRecordHash)
}
