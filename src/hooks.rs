//! Post-transfer reward hooks
//!
//! A hook runs after a transfer reaches `Completed` on a chain it applies to.
//! Its outcome never changes the transfer result: failures are recorded as a
//! warning in the session log.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tracing::info;

use crate::account::{evm_wallet_provider, SigningIdentity};
use crate::adapter::TxRef;
use crate::chain::{ChainContracts, ChainDescriptor, ChainId};
use crate::contracts::{Erc20Contract, OffsetManagerContract};
use crate::error::{CctpError, Result};
use crate::provider::send_and_confirm;

#[async_trait]
pub trait RewardHook: Send + Sync {
    /// Whether completed transfers into `destination` earn a reward.
    fn applies_to(&self, destination: ChainId) -> bool;

    /// Grants the reward for `amount` of delivered USDC, signing as
    /// `identity` on `destination`.
    async fn mint_loyalty_credit(
        &self,
        destination: &ChainDescriptor,
        identity: &SigningIdentity,
        amount: U256,
    ) -> Result<TxRef>;
}

/// Spends the delivered USDC on carbon offsets through an offset manager,
/// which credits the owner with carbon points.
#[derive(Debug, Clone)]
pub struct CarbonOffsetHook {
    rewards_chain: ChainId,
    offset_manager: Address,
}

impl CarbonOffsetHook {
    pub fn new(rewards_chain: ChainId, offset_manager: Address) -> Self {
        Self {
            rewards_chain,
            offset_manager,
        }
    }

    /// Offset manager on Arc testnet.
    pub fn arc_testnet(offset_manager: Address) -> Self {
        Self::new(ChainId::ARC_TESTNET, offset_manager)
    }

    async fn buy_offsets(
        &self,
        destination: &ChainDescriptor,
        identity: &SigningIdentity,
        amount: U256,
    ) -> Result<TxRef> {
        let ChainContracts::Evm { token, .. } = destination.contracts else {
            return Err(CctpError::InvalidConfig(format!(
                "{destination} has no EVM token for offsets"
            )));
        };
        let SigningIdentity::Evm(signer) = identity else {
            return Err(CctpError::InvalidConfig(format!(
                "{destination} needs an EVM identity"
            )));
        };

        let owner = signer.address();
        let provider = evm_wallet_provider(signer.clone(), destination)?;

        let erc20 = Erc20Contract::new(token, provider.clone());
        let approval = erc20.approve_transaction(owner, self.offset_manager, amount);
        send_and_confirm(&provider, approval, "approve offsets").await?;

        let manager = OffsetManagerContract::new(self.offset_manager, provider.clone());
        let purchase = manager.buy_offsets_transaction(owner, amount);
        let hash = send_and_confirm(&provider, purchase, "buyOffsets").await?;

        info!(
            chain = %destination,
            tx_hash = %hash,
            usdc_amount = %amount,
            offset_manager = %self.offset_manager,
            event = "carbon_offsets_purchased"
        );
        Ok(TxRef::from_evm(hash))
    }
}

#[async_trait]
impl RewardHook for CarbonOffsetHook {
    fn applies_to(&self, destination: ChainId) -> bool {
        destination == self.rewards_chain
    }

    async fn mint_loyalty_credit(
        &self,
        destination: &ChainDescriptor,
        identity: &SigningIdentity,
        amount: U256,
    ) -> Result<TxRef> {
        self.buy_offsets(destination, identity, amount)
            .await
            .map_err(|e| CctpError::SecondaryHookFailed {
                reason: e.to_string(),
            })
    }
}
