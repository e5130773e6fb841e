//! Proposal messages exchanged over a ledger channel.
//!
//! A proposal names a contract function and its string arguments. Proposals
//! sent over a signing channel carry the creator identity and an Ed25519
//! signature over [`Proposal::signing_bytes`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Proposal size limits.
pub mod limits {
    /// Max arguments in a proposal.
    pub const MAX_ARGS: usize = 8;
    /// Max total argument bytes.
    pub const MAX_ARG_BYTES: usize = 64 * 1024;
    /// Max function name length.
    pub const MAX_FUNCTION_LEN: usize = 64;
}

/// The identity a signing channel presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub msp_id: String,
    /// Public key PEM of the signer.
    pub certificate: String,
}

/// A contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub function: String,
    pub args: Vec<String>,
    /// Hex-encoded random nonce.
    pub nonce: String,
    pub creator: Option<Identity>,
}

impl Proposal {
    /// Create a proposal with a fresh random nonce.
    pub fn new(function: impl Into<String>, args: Vec<String>, creator: Option<Identity>) -> Self {
        use rand::RngCore;
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self {
            function: function.into(),
            args,
            nonce: hex::encode(nonce),
            creator,
        }
    }

    /// The bytes a signature covers.
    pub fn signing_bytes(&self) -> Vec<u8> {
        // Strings and vectors of strings always serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Transaction id: SHA-256 hex of nonce followed by the creator bytes.
    pub fn tx_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.as_bytes());
        if let Some(creator) = &self.creator {
            hasher.update(creator.msp_id.as_bytes());
            hasher.update(creator.certificate.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Check this proposal respects size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if self.function.is_empty() || self.function.len() > limits::MAX_FUNCTION_LEN {
            return Err("function name length out of range");
        }
        if self.args.len() > limits::MAX_ARGS {
            return Err("too many arguments");
        }
        let total: usize = self.args.iter().map(String::len).sum();
        if total > limits::MAX_ARG_BYTES {
            return Err("arguments too large");
        }
        Ok(())
    }
}

/// A proposal with an optional signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub proposal: Proposal,
    /// Hex-encoded Ed25519 signature; absent on read-only channels.
    pub signature: Option<String>,
}
