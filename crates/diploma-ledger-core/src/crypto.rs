//! Content hashing for documents and canonical forms.
//!
//! Everything is SHA-256 rendered as 64 lowercase hex characters.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::ValidationError;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Digest(pub [u8; 32]);

/// The fingerprint of a credential: the digest of its canonical form.
pub type RecordHash = Sha256Digest;

impl Sha256Digest {
    /// Compute the SHA-256 digest of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly 64 hex characters. Uppercase is accepted.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| ValidationError::InvalidDigest(format!("{}: {}", s, e)))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Sha256Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Sha256Digest> for String {
    fn from(digest: Sha256Digest) -> Self {
        digest.to_hex()
    }
}

/// Digest arbitrary bytes to 64 lowercase hex characters.
pub fn digest_hex(data: &[u8]) -> String {
    Sha256Digest::hash(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_lower_hex_64(s: &str) -> bool {
        s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    #[test]
    fn test_sha256_known_values() {
        assert_eq!(
            digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest_hex(b"fake-portrait-binary-content"),
            "1e03432b04f8c1aac704301f0907b6dd09a379c7dee1b7ec0ffe6a4ffac0f81d"
        );
    }

    #[test]
    fn test_digest_is_pure() {
        let data = b"fake-diploma-binary-content";
        let h1 = digest_hex(data);
        let h2 = digest_hex(data);
        assert_eq!(h1, h2);
        assert!(is_lower_hex_64(&h1));
        assert_ne!(h1, digest_hex(b"fake-diploma-binary-contenT"));
    }

    #[test]
    fn test_hex_roundtrip_and_case() {
        let digest = Sha256Digest::hash(b"abc");
        let hex = digest.to_hex();
        assert_eq!(Sha256Digest::from_hex(&hex).unwrap(), digest);
        assert_eq!(Sha256Digest::from_hex(&hex.to_uppercase()).unwrap(), digest);
        assert!(Sha256Digest::from_hex(&hex[..63]).is_err());
        assert!(Sha256Digest::from_hex("zz").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = Sha256Digest::hash(b"abc");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: Sha256Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
