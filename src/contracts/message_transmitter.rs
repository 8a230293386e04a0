//! MessageTransmitterV2 bindings

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use MessageTransmitterV2::MessageTransmitterV2Instance;

/// The CCTP v2 MessageTransmitter contract wrapper
///
/// `receiveMessage` verifies the attester signatures, marks the nonce as used
/// and mints USDC to the recipient encoded in the message.
pub struct MessageTransmitterV2Contract<P: Provider<Ethereum>> {
    instance: MessageTransmitterV2Instance<P>,
}

impl<P: Provider<Ethereum>> MessageTransmitterV2Contract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "message_transmitter_v2_contract_initialized"
        );
        Self {
            instance: MessageTransmitterV2Instance::new(address, provider),
        }
    }

    /// Builds an unsigned `receiveMessage` from `from`.
    ///
    /// `message` and `attestation` must be passed exactly as returned by the
    /// attestation service.
    pub fn receive_message_transaction(
        &self,
        from: Address,
        message: Bytes,
        attestation: Bytes,
    ) -> TransactionRequest {
        info!(
            from_address = %from,
            message_len = message.len(),
            attestation_len = attestation.len(),
            contract_address = %self.instance.address(),
            version = "v2",
            event = "receive_message_transaction_created"
        );

        self.instance
            .receiveMessage(message, attestation)
            .from(from)
            .into_transaction_request()
    }

    /// Whether a message with `nonce` has already been received here.
    pub async fn is_nonce_used(&self, nonce: FixedBytes<32>) -> Result<bool, alloy_contract::Error> {
        let used = self.instance.usedNonces(nonce).call().await?;
        debug!(
            nonce = %nonce,
            used = used != U256::ZERO,
            contract_address = %self.instance.address(),
            event = "used_nonce_checked"
        );
        Ok(used != U256::ZERO)
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MessageTransmitterV2 {
        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
        function usedNonces(bytes32 nonce) external view returns (uint256);
    }
);
