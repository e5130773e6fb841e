//! Strong type definitions for the diploma ledger.
//!
//! Identifiers and bounded values are newtypes so that an unvalidated string
//! can never reach the canonicalizer or the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Maximum length of a serial number, in characters.
pub const MAX_SERIAL_LEN: usize = 64;

/// A diploma serial number: the unique, immutable key of a credential.
///
/// Always trimmed and non-empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Parse and normalize a serial number.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingField("serialNo"));
        }
        if trimmed.chars().count() > MAX_SERIAL_LEN {
            return Err(ValidationError::InvalidSerial(format!(
                "longer than {} characters",
                MAX_SERIAL_LEN
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidSerial(
                "contains control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the serial as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerialNumber({})", self.0)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SerialNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl FromStr for SerialNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// The three documents every diploma record must carry before issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    Portrait,
    Diploma,
    Transcript,
}

impl DocumentKind {
    /// All kinds, in canonical order.
    pub const ALL: [DocumentKind; 3] = [Self::Portrait, Self::Diploma, Self::Transcript];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "PORTRAIT",
            Self::Diploma => "DIPLOMA",
            Self::Transcript => "TRANSCRIPT",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PORTRAIT" => Ok(Self::Portrait),
            "DIPLOMA" => Ok(Self::Diploma),
            "TRANSCRIPT" => Ok(Self::Transcript),
            _ => Err(ValidationError::InvalidDocumentKind(s.to_string())),
        }
    }
}

/// Grade point average, stored as hundredths to keep rendering exact.
///
/// Range is 0.00 through 4.00. Serialized as its two-decimal rendering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gpa(u16);

impl Gpa {
    /// Highest representable GPA, in hundredths.
    pub const MAX_HUNDREDTHS: u16 = 400;

    /// Create from hundredths (e.g. 380 for 3.80).
    pub fn from_hundredths(hundredths: u16) -> Result<Self, ValidationError> {
        if hundredths > Self::MAX_HUNDREDTHS {
            return Err(ValidationError::GpaOutOfRange(format!(
                "{}.{:02}",
                hundredths / 100,
                hundredths % 100
            )));
        }
        Ok(Self(hundredths))
    }

    /// Parse a decimal string such as `3.8`, `3.80` or ` 4 `.
    ///
    /// More than two fractional digits are rounded half-up.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let s = raw.trim();
        let invalid = || ValidationError::InvalidGpa(raw.to_string());

        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int_digits = int_part.trim_start_matches('0');
        if int_digits.len() > 3 {
            return Err(ValidationError::GpaOutOfRange(s.to_string()));
        }
        let whole: u32 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid())?
        };

        let frac = frac_part.as_bytes();
        let digit = |i: usize| frac.get(i).map(|b| u32::from(b - b'0')).unwrap_or(0);
        let mut hundredths = whole * 100 + digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            hundredths += 1;
        }

        let hundredths =
            u16::try_from(hundredths).map_err(|_| ValidationError::GpaOutOfRange(s.to_string()))?;
        Self::from_hundredths(hundredths).map_err(|_| ValidationError::GpaOutOfRange(s.to_string()))
    }

    /// Convert from a JSON number.
    pub fn from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::InvalidGpa(value.to_string()));
        }
        let scaled = (value * 100.0).round();
        if !(0.0..=f64::from(Self::MAX_HUNDREDTHS)).contains(&scaled) {
            return Err(ValidationError::GpaOutOfRange(value.to_string()));
        }
        Self::from_hundredths(scaled as u16)
    }

    pub const fn hundredths(&self) -> u16 {
        self.0
    }
}

impl fmt::Debug for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gpa({})", self)
    }
}

/// Always two decimal digits: `3.80`.
impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<String> for Gpa {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gpa> for String {
    fn from(gpa: Gpa) -> Self {
        gpa.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_is_trimmed() {
        let serial = SerialNumber::new("  VB001  ").unwrap();
        assert_eq!(serial.as_str(), "VB001");
        assert_eq!(serial, SerialNumber::new("VB001").unwrap());
    }

    #[test]
    fn test_serial_rejects_empty_and_control() {
        assert_eq!(
            SerialNumber::new("   "),
            Err(ValidationError::MissingField("serialNo"))
        );
        assert!(matches!(
            SerialNumber::new("VB\n001"),
            Err(ValidationError::InvalidSerial(_))
        ));
        assert!(SerialNumber::new(&"x".repeat(MAX_SERIAL_LEN + 1)).is_err());
    }

    #[test]
    fn test_gpa_rendering() {
        assert_eq!(Gpa::parse("3.8").unwrap().to_string(), "3.80");
        assert_eq!(Gpa::parse("3.80").unwrap().to_string(), "3.80");
        assert_eq!(Gpa::parse(" 4 ").unwrap().to_string(), "4.00");
        assert_eq!(Gpa::parse("0").unwrap().to_string(), "0.00");
        assert_eq!(Gpa::parse(".5").unwrap().to_string(), "0.50");
        assert_eq!(Gpa::parse("3.").unwrap().to_string(), "3.00");
        assert_eq!(Gpa::from_f64(3.8).unwrap().to_string(), "3.80");
        assert_eq!(Gpa::from_f64(2.0).unwrap().to_string(), "2.00");
    }

    #[test]
    fn test_gpa_rounds_half_up() {
        assert_eq!(Gpa::parse("3.805").unwrap().hundredths(), 381);
        assert_eq!(Gpa::parse("3.804").unwrap().hundredths(), 380);
        assert_eq!(Gpa::parse("3.995").unwrap().hundredths(), 400);
    }

    #[test]
    fn test_gpa_range() {
        assert!(matches!(Gpa::parse("4.01"), Err(ValidationError::GpaOutOfRange(_))));
        assert!(matches!(Gpa::parse("4.005"), Err(ValidationError::GpaOutOfRange(_))));
        assert!(matches!(Gpa::parse("12345"), Err(ValidationError::GpaOutOfRange(_))));
        assert!(matches!(Gpa::from_f64(-0.5), Err(ValidationError::GpaOutOfRange(_))));
        assert!(matches!(Gpa::parse("-1"), Err(ValidationError::InvalidGpa(_))));
        assert!(matches!(Gpa::parse("abc"), Err(ValidationError::InvalidGpa(_))));
        assert!(matches!(Gpa::parse(""), Err(ValidationError::InvalidGpa(_))));
        assert!(matches!(Gpa::from_f64(f64::NAN), Err(ValidationError::InvalidGpa(_))));
    }

    #[test]
    fn test_document_kind_parse() {
        assert_eq!("portrait".parse::<DocumentKind>().unwrap(), DocumentKind::Portrait);
        assert_eq!("TRANSCRIPT".parse::<DocumentKind>().unwrap(), DocumentKind::Transcript);
        assert!("photo".parse::<DocumentKind>().is_err());
    }
}
