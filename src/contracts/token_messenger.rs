//! TokenMessengerV2 bindings
//!
//! `depositForBurn` burns USDC on the source chain and emits the CCTP message
//! that Circle's attesters sign.

use alloy_network::Ethereum;
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use crate::protocol::{DomainId, FinalityThreshold};
use TokenMessengerV2::TokenMessengerV2Instance;

/// Arguments of a v2 `depositForBurn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurnArgs {
    pub amount: U256,
    pub destination_domain: DomainId,
    /// Token account credited on the destination, as a CCTP word
    pub mint_recipient: FixedBytes<32>,
    pub burn_token: Address,
    /// Sole account allowed to receive the message (zero = anyone)
    pub destination_caller: FixedBytes<32>,
    pub max_fee: U256,
    pub min_finality_threshold: FinalityThreshold,
}

/// The CCTP v2 TokenMessenger contract wrapper
pub struct TokenMessengerV2Contract<P: Provider<Ethereum>> {
    instance: TokenMessengerV2Instance<P>,
}

impl<P: Provider<Ethereum>> TokenMessengerV2Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "token_messenger_v2_contract_initialized"
        );
        Self {
            instance: TokenMessengerV2Instance::new(address, provider),
        }
    }

    /// Builds an unsigned `depositForBurn` from `from`.
    pub fn deposit_for_burn_transaction(
        &self,
        from: Address,
        args: &DepositForBurnArgs,
    ) -> TransactionRequest {
        info!(
            from_address = %from,
            amount = %args.amount,
            destination_domain = %args.destination_domain,
            mint_recipient = %args.mint_recipient,
            burn_token = %args.burn_token,
            destination_caller = %args.destination_caller,
            max_fee = %args.max_fee,
            min_finality_threshold = args.min_finality_threshold.as_u32(),
            contract_address = %self.instance.address(),
            version = "v2",
            event = "deposit_for_burn_transaction_created"
        );

        self.instance
            .depositForBurn(
                args.amount,
                args.destination_domain.as_u32(),
                args.mint_recipient,
                args.burn_token,
                args.destination_caller,
                args.max_fee,
                args.min_finality_threshold.as_u32(),
            )
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
    contract TokenMessengerV2 {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external;
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::recipient::evm_to_word;
    use alloy_primitives::address;
    use alloy_provider::ProviderBuilder;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_deposit_for_burn_calldata() {
        let provider = ProviderBuilder::new().connect_http("http://localhost:8545".parse().unwrap());
        let messenger = address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");
        let contract = TokenMessengerV2Contract::new(messenger, provider);

        let owner = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
        let args = DepositForBurnArgs {
            amount: U256::from(1_500_000u64),
            destination_domain: DomainId::Base,
            mint_recipient: evm_to_word(owner),
            burn_token: address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
            destination_caller: evm_to_word(owner),
            max_fee: U256::from(1_499_999u64),
            min_finality_threshold: FinalityThreshold::Fast,
        };

        let tx = contract.deposit_for_burn_transaction(owner, &args);
        assert_eq!(tx.from, Some(owner));

        let input = tx.input.input().unwrap();
        assert_eq!(&input[..4], &TokenMessengerV2::depositForBurnCall::SELECTOR);

        let call = TokenMessengerV2::depositForBurnCall::abi_decode(input).unwrap();
        assert_eq!(call.amount, args.amount);
        assert_eq!(call.destinationDomain, 6);
        assert_eq!(call.mintRecipient, args.mint_recipient);
        assert_eq!(call.burnToken, args.burn_token);
        assert_eq!(call.maxFee, args.max_fee);
        assert_eq!(call.minFinalityThreshold, 1000);
    }
}
