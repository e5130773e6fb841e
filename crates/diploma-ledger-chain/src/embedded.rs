//! An in-process ledger.
//!
//! Runs the diploma contract against a memory world state behind the same
//! channel interface a remote ledger uses: proposals are signed by the
//! caller, verified against the presented certificate, checked against the
//! admitted MSPs and executed one at a time. Contract errors cross the
//! channel as message strings.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use diploma_ledger_core::SigningCredential;

use crate::channel::{ChannelTarget, Connector, LedgerChannel};
use crate::contract::{self, TxContext};
use crate::entry::LedgerEntry;
use crate::error::{ContractError, LedgerError, Result};
use crate::messages::{Proposal, SignedProposal};
use crate::signing::{self, ProposalSigner};
use crate::world_state::{MemoryWorldState, Overlay, WorldState};

/// Configuration for an [`EmbeddedLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedLedgerConfig {
    pub channel: String,
    pub contract: String,
    /// MSPs whose members may submit transactions.
    pub admitted_msps: Vec<String>,
}

impl Default for EmbeddedLedgerConfig {
    fn default() -> Self {
        Self {
            channel: "mychannel".into(),
            contract: "vanbang".into(),
            admitted_msps: vec!["Org1MSP".into()],
        }
    }
}

impl EmbeddedLedgerConfig {
    pub fn from_json_str(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

struct Inner {
    config: EmbeddedLedgerConfig,
    state: Mutex<MemoryWorldState>,
    available: AtomicBool,
    open_channels: AtomicUsize,
}

/// An in-process ledger. Clones share state.
#[derive(Clone)]
pub struct EmbeddedLedger {
    inner: Arc<Inner>,
}

impl EmbeddedLedger {
    pub fn new(config: EmbeddedLedgerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(MemoryWorldState::new()),
                available: AtomicBool::new(true),
                open_channels: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &EmbeddedLedgerConfig {
        &self.inner.config
    }

    /// A connector that opens channels to this ledger.
    pub fn connector(&self) -> EmbeddedConnector {
        EmbeddedConnector {
            ledger: self.clone(),
        }
    }

    /// Make the ledger unreachable (or reachable again).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::SeqCst)
    }

    /// Channels opened and not yet released.
    pub fn open_channels(&self) -> usize {
        self.inner.open_channels.load(Ordering::SeqCst)
    }

    /// Committed entry for a key, bypassing the channel.
    pub async fn entry(&self, key: &str) -> Option<LedgerEntry> {
        self.inner.state.lock().await.get_state(key)
    }

    /// Number of committed entries.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("ledger is not reachable".into()))
        }
    }

    fn authorize(&self, signed: &SignedProposal) -> Result<()> {
        let creator =
            signing::verify(signed).map_err(|f| LedgerError::CredentialRejected(f.to_string()))?;
        if !self.inner.config.admitted_msps.contains(&creator.msp_id) {
            return Err(LedgerError::CredentialRejected(format!(
                "{} is not admitted to {}",
                creator.msp_id, self.inner.config.channel
            )));
        }
        Ok(())
    }

    async fn execute(&self, signed: SignedProposal, commit: bool) -> Result<String> {
        self.ensure_available()?;
        signed
            .proposal
            .validate_limits()
            .map_err(|e| LedgerError::Contract(ContractError::InvalidArgument(e.into())))?;
        if commit || signed.signature.is_some() {
            self.authorize(&signed)?;
        }

        let proposal = &signed.proposal;
        let ctx = TxContext {
            tx_id: proposal.tx_id(),
            timestamp: Utc::now(),
        };

        let mut state = self.inner.state.lock().await;
        let result = if commit {
            contract::invoke(&mut *state, &ctx, &proposal.function, &proposal.args)
        } else {
            let mut scratch = Overlay::new(&*state);
            contract::invoke(&mut scratch, &ctx, &proposal.function, &proposal.args)
        };
        drop(state);

        debug!(function = %proposal.function, tx_id = %ctx.tx_id, commit, ok = result.is_ok(), "executed proposal");
        // Errors travel as their message text.
        result.map_err(|e| LedgerError::Contract(ContractError::from_message(&e.to_string())))
    }
}

/// Opens channels to an [`EmbeddedLedger`].
#[derive(Clone)]
pub struct EmbeddedConnector {
    ledger: EmbeddedLedger,
}

#[async_trait]
impl Connector for EmbeddedConnector {
    type Channel = EmbeddedChannel;

    async fn open(
        &self,
        target: &ChannelTarget,
        credential: Option<&SigningCredential>,
    ) -> Result<EmbeddedChannel> {
        self.ledger.ensure_available()?;
        let config = self.ledger.config();
        if target.channel != config.channel || target.contract != config.contract {
            return Err(LedgerError::Unavailable(format!(
                "no contract {} on channel {}",
                target.contract, target.channel
            )));
        }

        let signer = credential.map(ProposalSigner::from_credential).transpose()?;
        self.ledger.inner.open_channels.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddedChannel {
            ledger: self.ledger.clone(),
            signer,
            released: AtomicBool::new(false),
        })
    }
}

/// A channel to an [`EmbeddedLedger`].
pub struct EmbeddedChannel {
    ledger: EmbeddedLedger,
    signer: Option<ProposalSigner>,
    released: AtomicBool,
}

impl EmbeddedChannel {
    fn ensure_open(&self) -> Result<()> {
        if self.released.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("channel released".into()));
        }
        Ok(())
    }

    fn prepare(&self, function: &str, args: Vec<String>) -> SignedProposal {
        let proposal = Proposal::new(function, args, None);
        match &self.signer {
            Some(signer) => signer.sign(proposal),
            None => SignedProposal {
                proposal,
                signature: None,
            },
        }
    }
}

#[async_trait]
impl LedgerChannel for EmbeddedChannel {
    async fn evaluate(&self, function: &str, args: Vec<String>) -> Result<String> {
        self.ensure_open()?;
        self.ledger.execute(self.prepare(function, args), false).await
    }

    async fn submit(&self, function: &str, args: Vec<String>) -> Result<String> {
        self.ensure_open()?;
        if self.signer.is_none() {
            return Err(LedgerError::CredentialRejected(
                "submit requires a signing identity".into(),
            ));
        }
        self.ledger.execute(self.prepare(function, args), true).await
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.ledger.inner.open_channels.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for EmbeddedChannel {
    fn drop(&mut self) {
        self.release();
    }
}
