use thiserror::Error;

use crate::adapter::TxRef;
use crate::chain::{ChainFamily, ChainId};

#[derive(Error, Debug)]
pub enum CctpError {
    #[error("Unknown chain: {0}")]
    UnknownChain(ChainId),

    #[error("Missing credential for {family} chains: set {variable}")]
    MissingCredential {
        family: ChainFamily,
        variable: &'static str,
    },

    #[error("Malformed credential for {family} chains: {reason}")]
    MalformedCredential { family: ChainFamily, reason: String },

    #[error("Invalid transfer intent: {0}")]
    InvalidIntent(String),

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Approval failed: {reason}")]
    ApprovalFailed { reason: String },

    #[error("Burn failed: {reason}")]
    BurnFailed { reason: String },

    #[error("Attestation service error (HTTP {status}): {reason}")]
    AttestationTransport { status: u16, reason: String },

    /// Message not yet indexed by the attestation service. Never surfaced to
    /// a session; the poller treats it as "keep waiting".
    #[error("Attestation not yet available")]
    AttestationPending,

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Timeout waiting for attestation after {waited_secs} seconds")]
    AttestationTimeout { waited_secs: u64 },

    #[error(
        "Insufficient gas balance on {chain}: have {balance}, need at least {required}"
    )]
    InsufficientGasBalance {
        chain: String,
        balance: String,
        required: String,
    },

    #[error("Mint failed after {attempts} attempt(s): {reason}")]
    MintFailed { attempts: u32, reason: String },

    /// The node refused the transaction before broadcasting it (underpriced
    /// gas, nonce race, RPC hiccup). Safe to resubmit.
    #[error("Transaction execution error: {reason}")]
    TransactionExecution { reason: String },

    /// The transaction was broadcast but its confirmation was lost. It may
    /// still land, so check on-chain state before resubmitting.
    #[error("Transaction {tx} was broadcast but not confirmed: {reason}")]
    TransactionUnconfirmed { tx: TxRef, reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Reward hook failed: {reason}")]
    SecondaryHookFailed { reason: String },

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("Solana RPC error: {0}")]
    SolanaRpc(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl CctpError {
    /// Returns true for failures that may succeed when the same transaction
    /// is submitted again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransactionExecution { .. } | Self::TransactionUnconfirmed { .. }
        )
    }

    /// The transaction this error was raised for, if it reached the network.
    pub fn broadcast_tx(&self) -> Option<&TxRef> {
        match self {
            Self::TransactionUnconfirmed { tx, .. } => Some(tx),
            _ => None,
        }
    }

    /// Short, stable name of the variant for span attributes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownChain(_) => "UnknownChain",
            Self::MissingCredential { .. } => "MissingCredential",
            Self::MalformedCredential { .. } => "MalformedCredential",
            Self::InvalidIntent(_) => "InvalidIntent",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::ApprovalFailed { .. } => "ApprovalFailed",
            Self::BurnFailed { .. } => "BurnFailed",
            Self::AttestationTransport { .. } => "AttestationTransportError",
            Self::AttestationPending => "AttestationPending",
            Self::AttestationFailed { .. } => "AttestationFailed",
            Self::AttestationTimeout { .. } => "AttestationTimeout",
            Self::InsufficientGasBalance { .. } => "InsufficientGasBalance",
            Self::MintFailed { .. } => "MintFailed",
            Self::TransactionExecution { .. } => "TransactionExecution",
            Self::TransactionUnconfirmed { .. } => "TransactionUnconfirmed",
            Self::TransactionFailed { .. } => "TransactionFailed",
            Self::SecondaryHookFailed { .. } => "SecondaryHookFailed",
            Self::Cancelled => "Cancelled",
            Self::InvalidAddress(_) => "InvalidAddress",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Provider(_) => "Provider",
            Self::ContractCall(_) => "ContractCall",
            Self::SolanaRpc(_) => "SolanaRpc",
            Self::Network(_) => "Network",
            Self::Rpc(_) => "Rpc",
            Self::Abi(_) => "Abi",
            Self::Json(_) => "Json",
            Self::Hex(_) => "Hex",
        }
    }
}

pub type Result<T> = std::result::Result<T, CctpError>;
