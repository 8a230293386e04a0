//! Carbon offset manager bindings

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use OffsetManager::OffsetManagerInstance;

/// Wrapper around the offset manager deployed on the rewards chain.
///
/// `buyOffsets` pulls `usdcAmount` of USDC from the caller, so it must be
/// preceded by an approval to this contract.
pub struct OffsetManagerContract<P: Provider<Ethereum>> {
    instance: OffsetManagerInstance<P>,
}

impl<P: Provider<Ethereum>> OffsetManagerContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "offset_manager_contract_initialized"
        );
        Self {
            instance: OffsetManagerInstance::new(address, provider),
        }
    }

    pub fn buy_offsets_transaction(&self, from: Address, usdc_amount: U256) -> TransactionRequest {
        info!(
            from_address = %from,
            usdc_amount = %usdc_amount,
            contract_address = %self.instance.address(),
            event = "buy_offsets_transaction_created"
        );

        self.instance
            .buyOffsets(usdc_amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract OffsetManager {
        function buyOffsets(uint256 usdcAmount) external;
    }
);
