//! Channel abstraction for ledger calls.
//!
//! A channel is opened for a single gateway call and released when the call
//! ends. Implementations may talk to a remote peer network or to an
//! in-process ledger.

use async_trait::async_trait;
use std::ops::Deref;

use diploma_ledger_core::SigningCredential;

use crate::error::Result;

/// Which channel and contract a connection addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    pub channel: String,
    pub contract: String,
}

/// An open connection to the ledger.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait LedgerChannel: Send + Sync {
    /// Run a read-only transaction. Nothing is committed.
    async fn evaluate(&self, function: &str, args: Vec<String>) -> Result<String>;

    /// Run a transaction and wait for it to commit.
    ///
    /// Returns the contract's JSON result.
    async fn submit(&self, function: &str, args: Vec<String>) -> Result<String>;

    /// Release every resource held by the channel.
    ///
    /// Must be idempotent; later calls on the channel fail.
    fn release(&self);
}

/// Opens channels.
#[async_trait]
pub trait Connector: Send + Sync {
    type Channel: LedgerChannel;

    /// Open a channel. Without a credential the channel is read-only.
    async fn open(
        &self,
        target: &ChannelTarget,
        credential: Option<&SigningCredential>,
    ) -> Result<Self::Channel>;
}

/// A channel released when dropped, on every exit path.
pub struct ScopedChannel<C: LedgerChannel> {
    inner: C,
}

impl<C: LedgerChannel> ScopedChannel<C> {
    pub fn new(inner: C) -> Self {
        tracing::debug!("ledger channel opened");
        Self { inner }
    }
}

impl<C: LedgerChannel> Deref for ScopedChannel<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: LedgerChannel> Drop for ScopedChannel<C> {
    fn drop(&mut self) {
        self.inner.release();
        tracing::debug!("ledger channel released");
    }
}
