//! The ledger gateway: read, issue and revoke over per-call channels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use diploma_ledger_core::{CredentialFields, RecordHash, SerialNumber, SigningCredential};

use crate::channel::{ChannelTarget, Connector, LedgerChannel, ScopedChannel};
use crate::contract::functions;
use crate::entry::{IssuePayload, LedgerEntry};
use crate::error::{LedgerError, Result};

/// Where ledger calls go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub channel: String,
    pub contract: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            channel: "mychannel".into(),
            contract: "vanbang".into(),
        }
    }
}

impl GatewayConfig {
    pub fn from_json_str(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn target(&self) -> ChannelTarget {
        ChannelTarget {
            channel: self.channel.clone(),
            contract: self.contract.clone(),
        }
    }
}

/// Ledger operations used by the registry.
///
/// `issue` and `revoke` take the caller's signing credential for that call
/// only. Implementations never keep it beyond the call.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Read the entry for a serial. Absent entries fail with `NOT_FOUND`.
    async fn read(&self, serial_no: &SerialNumber) -> Result<LedgerEntry>;

    /// Create an `ISSUED` entry.
    async fn issue(
        &self,
        serial_no: &SerialNumber,
        fields: &CredentialFields,
        record_hash: &RecordHash,
        credential: &SigningCredential,
    ) -> Result<LedgerEntry>;

    /// Move an `ISSUED` entry to `REVOKED`.
    async fn revoke(
        &self,
        serial_no: &SerialNumber,
        revoked_at: DateTime<Utc>,
        credential: &SigningCredential,
    ) -> Result<LedgerEntry>;
}

/// [`LedgerGateway`] over any [`Connector`].
///
/// Every call opens a fresh channel and releases it before returning.
pub struct Gateway<C: Connector> {
    connector: C,
    config: GatewayConfig,
}

impl<C: Connector> Gateway<C> {
    pub fn new(connector: C, config: GatewayConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn open(
        &self,
        credential: Option<&SigningCredential>,
    ) -> Result<ScopedChannel<C::Channel>> {
        let channel = self.connector.open(&self.config.target(), credential).await?;
        Ok(ScopedChannel::new(channel))
    }

    async fn submit(
        &self,
        credential: &SigningCredential,
        function: &str,
        args: Vec<String>,
    ) -> Result<LedgerEntry> {
        let channel = self.open(Some(credential)).await?;
        let response = channel.submit(function, args).await;
        drop(channel);
        parse_entry(&response?)
    }
}

#[async_trait]
impl<C: Connector> LedgerGateway for Gateway<C> {
    #[instrument(skip(self), fields(serial = %serial_no))]
    async fn read(&self, serial_no: &SerialNumber) -> Result<LedgerEntry> {
        let channel = self.open(None).await?;
        let response = channel
            .evaluate(functions::READ, vec![serial_no.to_string()])
            .await;
        drop(channel);
        parse_entry(&response?)
    }

    #[instrument(skip_all, fields(serial = %serial_no, msp = %credential.msp_id()))]
    async fn issue(
        &self,
        serial_no: &SerialNumber,
        fields: &CredentialFields,
        record_hash: &RecordHash,
        credential: &SigningCredential,
    ) -> Result<LedgerEntry> {
        let payload = IssuePayload::new(fields, record_hash);
        let json = serde_json::to_string(&payload)
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;

        match self
            .submit(credential, functions::ISSUE, vec![serial_no.to_string(), json])
            .await
        {
            Ok(entry) => {
                info!(tx_id = %entry.tx_id, record_hash = %entry.record_hash, "diploma issued on ledger");
                Ok(entry)
            }
            Err(e) => {
                warn!(error = %e, "ledger issue failed");
                Err(e)
            }
        }
    }

    #[instrument(skip_all, fields(serial = %serial_no, msp = %credential.msp_id()))]
    async fn revoke(
        &self,
        serial_no: &SerialNumber,
        revoked_at: DateTime<Utc>,
        credential: &SigningCredential,
    ) -> Result<LedgerEntry> {
        let args = vec![serial_no.to_string(), revoked_at.to_rfc3339()];
        match self.submit(credential, functions::REVOKE, args).await {
            Ok(entry) => {
                info!(tx_id = %entry.tx_id, "diploma revoked on ledger");
                Ok(entry)
            }
            Err(e) => {
                warn!(error = %e, "ledger revoke failed");
                Err(e)
            }
        }
    }
}

fn parse_entry(json: &str) -> Result<LedgerEntry> {
    serde_json::from_str(json).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
}
