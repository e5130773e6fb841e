//! Caller-supplied signing credentials.
//!
//! A credential authorizes one privileged ledger call. It is parsed from the
//! wallet JSON bundle `{ "mspId", "certificate", "privateKey" }` and never
//! retained past the call it was supplied for.

use serde::Deserialize;
use std::fmt;

use crate::error::ValidationError;

/// Issuer identity, certificate and private key for one ledger write.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCredential {
    msp_id: String,
    certificate: String,
    private_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCredential {
    msp_id: Option<String>,
    certificate: Option<String>,
    private_key: Option<String>,
}

impl SigningCredential {
    pub fn new(
        msp_id: impl Into<String>,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let msp_id = msp_id.into();
        let certificate = certificate.into();
        let private_key = private_key.into();
        let required = [
            ("mspId", &msp_id),
            ("certificate", &certificate),
            ("privateKey", &private_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidCredential(format!("{name} required")));
            }
        }
        Ok(Self {
            msp_id: msp_id.trim().to_string(),
            certificate,
            private_key,
        })
    }

    /// Parse a wallet bundle. All three fields are required.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ValidationError> {
        let raw: RawCredential = serde_json::from_slice(bytes)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        Self::new(
            raw.msp_id.unwrap_or_default(),
            raw.certificate.unwrap_or_default(),
            raw.private_key.unwrap_or_default(),
        )
    }

    /// Parse a wallet bundle, rejecting oversized input before parsing.
    pub fn from_json_limited(bytes: &[u8], limit: usize) -> Result<Self, ValidationError> {
        if bytes.len() > limit {
            return Err(ValidationError::CredentialTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        Self::from_json(bytes)
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// PEM-encoded certificate.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    /// PEM-encoded private key.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCredential")
            .field("msp_id", &self.msp_id)
            .field("certificate", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}
