//! # Diploma Ledger Chain
//!
//! The ledger side of diploma issuance: the diploma contract, the channels
//! that carry signed proposals to it, and the gateway the registry calls.
//!
//! ## Overview
//!
//! The contract is a pure state-transition function over a [`WorldState`].
//! A [`Connector`] opens a [`LedgerChannel`] per call; [`Gateway`] wraps any
//! connector as a [`LedgerGateway`], opening a fresh channel for every read,
//! issue and revoke and releasing it before returning. [`EmbeddedLedger`]
//! runs the contract in process behind the same interface.
//!
//! ## Key Properties
//!
//! - **Write-once**: An entry is created once and only moves `ISSUED -> REVOKED`
//! - **Per-call identity**: Signing credentials are used for one call and dropped
//! - **No retries**: A failed ledger call is reported, never repeated
//!
//! ## Usage
//!
//! ```rust,no_run
//! use diploma_ledger_chain::{EmbeddedLedger, EmbeddedLedgerConfig, Gateway, GatewayConfig, LedgerGateway};
//! use diploma_ledger_core::SerialNumber;
//!
//! async fn example() {
//!     let ledger = EmbeddedLedger::new(EmbeddedLedgerConfig::default());
//!     let gateway = Gateway::new(ledger.connector(), GatewayConfig::default());
//!
//!     let serial = SerialNumber::new("VB001").unwrap();
//!     match gateway.read(&serial).await {
//!         Ok(entry) => println!("{} is {}", entry.serial_no, entry.status),
//!         Err(e) if e.is_not_found() => println!("not on ledger"),
//!         Err(e) => eprintln!("ledger error: {e}"),
//!     }
//! }
//! ```
//!
//! ## Call Flow
//!
//! ```text
//! Registry            Gateway                 Channel               Contract
//!   |-- issue() ------->|                        |                      |
//!   |                   |-- open(credential) --->|                      |
//!   |                   |-- submit(IssueDiploma)>|-- signed proposal -->|
//!   |                   |<------ entry JSON -----|<----- entry ---------|
//!   |                   |-- release ------------>|                      |
//!   |<-- LedgerEntry ---|                        |                      |
//! ```

pub mod channel;
pub mod contract;
pub mod embedded;
pub mod entry;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod signing;
pub mod world_state;

pub use channel::{ChannelTarget, Connector, LedgerChannel, ScopedChannel};
pub use contract::{invoke, TxContext};
pub use embedded::{EmbeddedChannel, EmbeddedConnector, EmbeddedLedger, EmbeddedLedgerConfig};
pub use entry::{IssuePayload, LedgerEntry, LedgerStatus};
pub use error::{ContractError, LedgerError, Result};
pub use gateway::{Gateway, GatewayConfig, LedgerGateway};
pub use messages::{limits, Identity, Proposal, SignedProposal};
pub use signing::{ProposalSigner, SignatureFault};
pub use world_state::{MemoryWorldState, Overlay, WorldState};
