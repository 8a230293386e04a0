//! # cctp-transfer
//!
//! Cross-chain USDC transfers over Circle's Cross-Chain Transfer Protocol
//! (CCTP v2), across EVM chains and Solana.
//!
//! A transfer burns USDC on the source chain, waits for Circle's attestation
//! service to certify the burn, and mints on the destination chain. The
//! [`TransferOrchestrator`] drives those steps as one state machine and keeps
//! a timestamped log of everything it does in a [`TransferSession`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cctp_transfer::{
//!     ChainId, ClientFactory, IrisAttestationProvider, Settings, SpeedMode, TokioClock,
//!     TransferIntent, TransferOrchestrator, TransferPhase,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // EVM_PRIVATE_KEY, SOLANA_PRIVATE_KEY, IRIS_API_URL, RPC_URL_<chain id>
//! let settings = Settings::from_env()?;
//!
//! let orchestrator = TransferOrchestrator::builder()
//!     .attestation_provider(IrisAttestationProvider::new(settings.iris_api_url()))
//!     .clients(ClientFactory::new(settings))
//!     .clock(TokioClock::new())
//!     .build();
//!
//! let intent = TransferIntent::new(
//!     ChainId::ETHEREUM_SEPOLIA,
//!     ChainId::SOLANA_DEVNET,
//!     "25",
//!     SpeedMode::Fast,
//! )?;
//! let session = orchestrator
//!     .execute_transfer(intent, &CancellationToken::new())
//!     .await;
//!
//! if session.phase() == TransferPhase::Completed {
//!     println!("minted in {}", session.mint_tx().unwrap());
//! } else {
//!     println!("failed: {}", session.last_error().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Balances
//!
//! ```rust,no_run
//! use cctp_transfer::{BalanceOracle, ChainId, ClientFactory, Settings};
//!
//! # async fn example() -> Result<(), cctp_transfer::CctpError> {
//! let clients = ClientFactory::new(Settings::from_env()?);
//! let oracle = BalanceOracle::new(&clients);
//!
//! // "0" when the owner has no token account yet
//! let balance = oracle
//!     .balance_of(ChainId::SOLANA_DEVNET, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`TransferOrchestrator`], [`TransferIntent`], [`TransferSession`] and
//!   [`SessionHandle`] - running and observing transfers
//! - [`ChainRegistry`] and [`ChainDescriptor`] - supported chains
//! - [`ClientFactory`] and [`SigningIdentity`] - credentials and RPC clients
//! - [`ChainAdapter`] with [`EvmAdapter`] and [`SolanaAdapter`]
//! - [`AttestationPoller`] and [`AttestationPolicy`]
//! - [`BalanceOracle`]
//! - [`RewardHook`] and [`CarbonOffsetHook`]
//! - [`CctpError`] and [`Result`]
//! - Trait seams [`AttestationProvider`], [`Clock`], [`SolanaRpc`] and
//!   [`ChainClients`], with fakes in [`testing`]

mod account;
mod adapter;
mod balance;
mod chain;
mod config;
mod error;
mod hooks;
mod poller;
mod protocol;
mod traits;
mod transfer;

pub mod contracts;
pub mod provider;
pub mod providers;
pub mod spans;
pub mod testing;

pub use account::{evm_wallet_provider, ClientFactory, ReadClient, SigningIdentity};
pub use adapter::solana::{instructions as solana_instructions, pda as solana_pda};
pub use adapter::{ApproveOutcome, BurnRequest, ChainAdapter, EvmAdapter, SolanaAdapter, TxRef};
pub use balance::{format_units, BalanceOracle};
pub use chain::addresses;
pub use chain::{
    BalanceSource, ChainContracts, ChainDescriptor, ChainFamily, ChainId, ChainRegistry,
};
pub use config::{
    classify_attestation_error, AttestationPolicy, MintRetryPolicy, PollDecision, Settings,
    IRIS_API, IRIS_API_SANDBOX,
};
pub use error::{CctpError, Result};
pub use hooks::{CarbonOffsetHook, RewardHook};
pub use poller::{AttestationPoller, PollProgress, PollWait};
pub use protocol::recipient;
pub use protocol::{
    AttestationRecord, AttestationStatus, DomainId, FinalityThreshold, MessageHeader,
    V2AttestationResponse, V2Message,
};
pub use providers::{IrisAttestationProvider, SolanaRpcClient, TokioClock};
pub use traits::{AttestationProvider, ChainClients, Clock, SolanaRpc};
pub use transfer::{
    parse_usdc, LogEntry, LogKind, SessionHandle, SpeedMode, TransferIntent,
    TransferOrchestrator, TransferPhase, TransferSession, USDC_DECIMALS,
};
