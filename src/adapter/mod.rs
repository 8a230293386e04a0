//! Chain adapters
//!
//! A [`ChainAdapter`] is one signing identity bound to one chain. It knows how
//! to approve, burn and mint on that chain; the orchestrator never branches on
//! chain family.

mod evm;
pub mod solana;

use alloy_primitives::{Bytes, FixedBytes, TxHash, U256};
use async_trait::async_trait;
use std::fmt;

use crate::chain::ChainDescriptor;
use crate::error::Result;
use crate::protocol::{DomainId, FinalityThreshold};

pub use evm::EvmAdapter;
pub use solana::SolanaAdapter;

/// Chain-native transaction reference: `0x` hex hash on EVM, base58
/// signature on Solana.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxRef(String);

impl TxRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn from_evm(hash: TxHash) -> Self {
        Self(format!("{hash:#x}"))
    }

    pub fn from_solana(signature: &solana_sdk::signature::Signature) -> Self {
        Self(signature.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproveOutcome {
    Submitted(TxRef),
    /// The chain burns from the owner's token account directly.
    NotRequired,
}

/// Parameters of a burn, already resolved to protocol values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnRequest {
    pub amount: U256,
    pub destination_domain: DomainId,
    pub mint_recipient: FixedBytes<32>,
    pub destination_caller: FixedBytes<32>,
    pub max_fee: U256,
    pub finality: FinalityThreshold,
}

#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn descriptor(&self) -> &ChainDescriptor;

    /// Owner address in the chain's native text form.
    fn owner(&self) -> String;

    /// Token account that receives minted USDC on this chain, as a CCTP
    /// word: the owner's address on EVM, the owner's associated token account
    /// on Solana.
    fn derive_recipient(&self) -> Result<FixedBytes<32>>;

    /// The owner as a CCTP word, used as `destinationCaller` so only this
    /// identity can complete the mint.
    fn caller_word(&self) -> FixedBytes<32>;

    /// Authorizes the token messenger to pull `amount`. Waits for
    /// confirmation.
    async fn approve(&self, amount: U256) -> Result<ApproveOutcome>;

    /// Submits `depositForBurn` and waits for confirmation.
    async fn burn(&self, request: &BurnRequest) -> Result<TxRef>;

    /// Submits `receiveMessage` with the attested bytes and waits for
    /// confirmation.
    async fn mint(&self, message: &Bytes, attestation: &Bytes) -> Result<TxRef>;

    /// Whether this chain has already processed `message`, i.e. its nonce is
    /// marked used. Decides whether a mint whose confirmation was lost landed.
    async fn message_received(&self, message: &Bytes) -> Result<bool>;

    /// Native gas balance of the owner in base units.
    async fn native_balance(&self) -> Result<U256>;

    /// Gas the owner must hold before a mint is attempted.
    fn min_gas_balance(&self) -> U256;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_tx_ref_formats() {
        let hash = b256!("912f22a13e9ccb979b621500f6952b2afd6e75be7eadaed93fc2625fe11c52a2");
        insta::assert_snapshot!(
            TxRef::from_evm(hash),
            @"0x912f22a13e9ccb979b621500f6952b2afd6e75be7eadaed93fc2625fe11c52a2"
        );

        let signature = solana_sdk::signature::Signature::from([1u8; 64]);
        let tx = TxRef::from_solana(&signature);
        assert_eq!(bs58::decode(tx.as_str()).into_vec().unwrap(), vec![1u8; 64]);
    }
}
