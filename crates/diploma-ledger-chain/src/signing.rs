//! Proposal signing and verification.
//!
//! Signing credentials carry an Ed25519 private key as PKCS#8 PEM and the
//! matching public key as SPKI PEM in the `certificate` field.

use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use diploma_ledger_core::{SigningCredential, ValidationError};

use crate::messages::{Identity, Proposal, SignedProposal};

/// Signs proposals for one credential.
///
/// Lives only as long as the channel it was created for.
pub struct ProposalSigner {
    key: SigningKey,
    identity: Identity,
}

impl ProposalSigner {
    /// Decode the private key of a credential.
    pub fn from_credential(credential: &SigningCredential) -> Result<Self, ValidationError> {
        let key = SigningKey::from_pkcs8_pem(credential.private_key())
            .map_err(|_| ValidationError::InvalidCredential("privateKey is not a valid key".into()))?;
        Ok(Self {
            key,
            identity: Identity {
                msp_id: credential.msp_id().to_string(),
                certificate: credential.certificate().to_string(),
            },
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sign a proposal, stamping it with this signer's identity.
    pub fn sign(&self, mut proposal: Proposal) -> SignedProposal {
        proposal.creator = Some(self.identity.clone());
        let signature = self.key.sign(&proposal.signing_bytes());
        SignedProposal {
            proposal,
            signature: Some(hex::encode(signature.to_bytes())),
        }
    }
}

impl std::fmt::Debug for ProposalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProposalSigner")
            .field("msp_id", &self.identity.msp_id)
            .finish_non_exhaustive()
    }
}

/// Why a signed proposal was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureFault {
    Unsigned,
    BadCertificate,
    BadSignature,
}

impl std::fmt::Display for SignatureFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unsigned => "proposal is not signed",
            Self::BadCertificate => "certificate is not a valid public key",
            Self::BadSignature => "signature does not match certificate",
        })
    }
}

/// Verify a signed proposal against the certificate of its creator.
pub fn verify(signed: &SignedProposal) -> Result<&Identity, SignatureFault> {
    let (creator, signature) = match (&signed.proposal.creator, &signed.signature) {
        (Some(creator), Some(signature)) => (creator, signature),
        _ => return Err(SignatureFault::Unsigned),
    };

    let key = VerifyingKey::from_public_key_pem(&creator.certificate)
        .map_err(|_| SignatureFault::BadCertificate)?;
    let bytes = hex::decode(signature).map_err(|_| SignatureFault::BadSignature)?;
    let signature = Signature::from_slice(&bytes).map_err(|_| SignatureFault::BadSignature)?;

    key.verify(&signed.proposal.signing_bytes(), &signature)
        .map_err(|_| SignatureFault::BadSignature)?;
    Ok(creator)
}
