//! Registry configuration.

use serde::{Deserialize, Serialize};

use diploma_ledger_core::{DocumentBlob, ValidationError};
use diploma_ledger_store::RecordFilter;

/// Size and type limits on caller-supplied uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_document_bytes: usize,
    pub max_credential_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_document_bytes: 5 * 1024 * 1024,
            max_credential_bytes: 1024 * 1024,
            allowed_mime_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "application/pdf".into(),
            ],
        }
    }
}

impl UploadLimits {
    /// Check a document against the size limit and the mime allow-list.
    pub fn check_document(&self, blob: &DocumentBlob) -> Result<(), ValidationError> {
        if blob.size() > self.max_document_bytes {
            return Err(ValidationError::DocumentTooLarge {
                kind: blob.kind,
                size: blob.size(),
                limit: self.max_document_bytes,
            });
        }
        let mime = blob.mime_type.trim();
        if !self
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
        {
            return Err(ValidationError::UnsupportedMimeType {
                kind: blob.kind,
                mime_type: blob.mime_type.clone(),
            });
        }
        Ok(())
    }
}

/// Configuration for the [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub limits: UploadLimits,
    /// Most records a listing returns.
    pub list_limit: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            limits: UploadLimits::default(),
            list_limit: RecordFilter::DEFAULT_LIMIT,
        }
    }
}

impl RegistryConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diploma_ledger_core::DocumentKind;

    #[test]
    fn test_defaults_and_partial_json() {
        let config = RegistryConfig::default();
        assert_eq!(config.list_limit, 50);
        assert_eq!(config.limits.max_document_bytes, 5 * 1024 * 1024);

        let parsed =
            RegistryConfig::from_json_str(r#"{"limits":{"max_document_bytes":16}}"#).unwrap();
        assert_eq!(parsed.limits.max_document_bytes, 16);
        assert_eq!(parsed.limits.max_credential_bytes, 1024 * 1024);
        assert_eq!(parsed.limits.allowed_mime_types.len(), 3);
        assert_eq!(parsed.list_limit, 50);
    }

    #[test]
    fn test_check_document() {
        let limits = UploadLimits {
            max_document_bytes: 4,
            ..Default::default()
        };
        let ok = DocumentBlob::new(DocumentKind::Diploma, "d.pdf", "Application/PDF", &b"1234"[..]);
        assert!(limits.check_document(&ok).is_ok());

        let big = DocumentBlob::new(DocumentKind::Diploma, "d.pdf", "application/pdf", &b"12345"[..]);
        assert!(matches!(
            limits.check_document(&big),
            Err(ValidationError::DocumentTooLarge { size: 5, limit: 4, .. })
        ));

        let gif = DocumentBlob::new(DocumentKind::Portrait, "p.gif", "image/gif", &b"gif"[..]);
        assert!(matches!(
            limits.check_document(&gif),
            Err(ValidationError::UnsupportedMimeType { kind: DocumentKind::Portrait, .. })
        ));
    }
}
