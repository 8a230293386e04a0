//! Core trait abstractions for transfer orchestration.
//!
//! Every side effect of a transfer (attestation lookups, time, Solana RPC and
//! per-chain client construction) sits behind one of these traits so the
//! orchestrator can be driven by fakes in tests, including adversarial
//! scenarios such as flaky attestation APIs or failing mints.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use cctp_transfer::{AttestationProvider, DomainId, TxRef, V2AttestationResponse};
//!
//! struct AlwaysPending;
//!
//! #[async_trait::async_trait]
//! impl AttestationProvider for AlwaysPending {
//!     async fn get_messages(&self, _domain: DomainId, _tx: &TxRef)
//!         -> cctp_transfer::Result<V2AttestationResponse> {
//!         Err(cctp_transfer::CctpError::AttestationPending)
//!     }
//! }
//! ```

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::account::{ReadClient, SigningIdentity};
use crate::adapter::{ChainAdapter, TxRef};
use crate::chain::{ChainId, ChainRegistry};
use crate::error::Result;
use crate::protocol::{DomainId, V2AttestationResponse};

/// Trait for attestation retrieval from Circle's Iris API.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Messages that are not indexed yet (404)
/// - State transitions (Pending → PendingConfirmations → Complete)
/// - Failed attestations
/// - Outages that must abort polling
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches the messages emitted by the burn transaction `tx` on
    /// `source_domain`.
    ///
    /// # Errors
    ///
    /// - [`CctpError::AttestationPending`](crate::CctpError::AttestationPending)
    ///   when the service does not know the transaction yet
    /// - [`CctpError::AttestationTransport`](crate::CctpError::AttestationTransport)
    ///   for any other non-success HTTP status
    /// - network or decoding errors
    async fn get_messages(&self, source_domain: DomainId, tx: &TxRef)
        -> Result<V2AttestationResponse>;
}

/// Trait for time-based operations.
///
/// Lets tests fast-forward through polling loops and retry backoff without
/// actually waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}

/// The subset of Solana JSON-RPC a transfer needs.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Account data, or `None` if the account does not exist.
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Lamport balance.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// Submits a signed transaction and waits for confirmation.
    ///
    /// Losing track of a transaction that was already sent yields
    /// [`CctpError::TransactionUnconfirmed`](crate::CctpError::TransactionUnconfirmed).
    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature>;
}

/// Factory for everything chain-specific a transfer touches.
///
/// Implementations only construct clients; no method performs network I/O,
/// so the orchestrator can resolve both chains before submitting anything.
pub trait ChainClients: Send + Sync {
    fn registry(&self) -> &ChainRegistry;

    /// Signing identity for the chain's family.
    ///
    /// # Errors
    ///
    /// Missing or malformed credentials for that family, or an unknown chain.
    fn identity_for(&self, chain_id: ChainId) -> Result<SigningIdentity>;

    /// Read-only client for balance queries.
    fn read_client_for(&self, chain_id: ChainId) -> Result<ReadClient>;

    /// Signing adapter that can approve, burn and mint on the chain.
    fn adapter_for(&self, chain_id: ChainId) -> Result<Arc<dyn ChainAdapter>>;
}
