use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, FixedBytes, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use tracing::{info, Instrument};

use super::{ApproveOutcome, BurnRequest, ChainAdapter, TxRef};
use crate::chain::{ChainContracts, ChainDescriptor};
use crate::contracts::{
    DepositForBurnArgs, Erc20Contract, MessageTransmitterV2Contract, TokenMessengerV2Contract,
};
use crate::error::{CctpError, Result};
use crate::protocol::recipient::evm_to_word;
use crate::protocol::MessageHeader;
use crate::provider::{estimate_gas_with_buffer, send_and_confirm};
use crate::spans;

/// 0.01 of the native token (18 decimals)
pub const EVM_MIN_GAS_BALANCE: u64 = 10_000_000_000_000_000;

/// [`ChainAdapter`] for EVM chains, signing through an alloy wallet provider.
pub struct EvmAdapter {
    descriptor: ChainDescriptor,
    owner: Address,
    token: Address,
    token_messenger: Address,
    message_transmitter: Address,
    provider: DynProvider,
    gas_buffer_percent: u64,
}

impl EvmAdapter {
    /// `provider` must sign for `owner`.
    pub fn new(
        descriptor: ChainDescriptor,
        owner: Address,
        provider: DynProvider,
        gas_buffer_percent: u64,
    ) -> Result<Self> {
        let ChainContracts::Evm {
            token,
            token_messenger,
            message_transmitter,
        } = descriptor.contracts
        else {
            return Err(CctpError::InvalidConfig(format!(
                "{descriptor} is not an EVM chain"
            )));
        };

        Ok(Self {
            descriptor,
            owner,
            token,
            token_messenger,
            message_transmitter,
            provider,
            gas_buffer_percent,
        })
    }

    /// `approve(tokenMessenger, amount)` on the USDC contract.
    fn approve_request(&self, amount: U256) -> TransactionRequest {
        Erc20Contract::new(self.token, self.provider.clone()).approve_transaction(
            self.owner,
            self.token_messenger,
            amount,
        )
    }

    /// `receiveMessage` with the buffered gas estimate as its limit.
    async fn mint_request(&self, message: &Bytes, attestation: &Bytes) -> Result<TransactionRequest> {
        let transmitter =
            MessageTransmitterV2Contract::new(self.message_transmitter, self.provider.clone());
        let tx =
            transmitter.receive_message_transaction(self.owner, message.clone(), attestation.clone());

        let gas_limit =
            estimate_gas_with_buffer(&self.provider, &tx, Some(self.gas_buffer_percent)).await?;
        Ok(tx.with_gas_limit(gas_limit))
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    fn owner(&self) -> String {
        self.owner.to_checksum(None)
    }

    fn derive_recipient(&self) -> Result<FixedBytes<32>> {
        Ok(evm_to_word(self.owner))
    }

    fn caller_word(&self) -> FixedBytes<32> {
        evm_to_word(self.owner)
    }

    async fn approve(&self, amount: U256) -> Result<ApproveOutcome> {
        let hash = send_and_confirm(&self.provider, self.approve_request(amount), "approve").await?;

        info!(
            chain = %self.descriptor,
            tx_hash = %hash,
            amount = %amount,
            spender = %self.token_messenger,
            event = "approval_confirmed"
        );
        Ok(ApproveOutcome::Submitted(TxRef::from_evm(hash)))
    }

    async fn burn(&self, request: &BurnRequest) -> Result<TxRef> {
        let span = spans::deposit_for_burn(
            &self.descriptor,
            request.destination_domain,
            &request.amount,
            request.finality,
        );

        async {
            let messenger = TokenMessengerV2Contract::new(self.token_messenger, self.provider.clone());
            let args = DepositForBurnArgs {
                amount: request.amount,
                destination_domain: request.destination_domain,
                mint_recipient: request.mint_recipient,
                burn_token: self.token,
                destination_caller: request.destination_caller,
                max_fee: request.max_fee,
                min_finality_threshold: request.finality,
            };
            let tx = messenger.deposit_for_burn_transaction(self.owner, &args);
            let hash = send_and_confirm(&self.provider, tx, "depositForBurn").await?;
            Ok::<_, CctpError>(TxRef::from_evm(hash))
        }
        .instrument(span)
        .await
    }

    async fn mint(&self, message: &Bytes, attestation: &Bytes) -> Result<TxRef> {
        let span = spans::receive_message(&self.descriptor, message.len());

        async {
            let tx = self.mint_request(message, attestation).await?;
            let hash = send_and_confirm(&self.provider, tx, "receiveMessage").await?;
            Ok::<_, CctpError>(TxRef::from_evm(hash))
        }
        .instrument(span)
        .await
    }

    async fn message_received(&self, message: &Bytes) -> Result<bool> {
        let header = MessageHeader::decode(message).ok_or_else(|| {
            CctpError::ContractCall(format!("message of {} bytes has no v2 header", message.len()))
        })?;
        MessageTransmitterV2Contract::new(self.message_transmitter, self.provider.clone())
            .is_nonce_used(header.nonce)
            .await
            .map_err(|e| CctpError::ContractCall(format!("usedNonces: {e}")))
    }

    async fn native_balance(&self) -> Result<U256> {
        Ok(self.provider.get_balance(self.owner).await?)
    }

    fn min_gas_balance(&self) -> U256 {
        U256::from(EVM_MIN_GAS_BALANCE)
    }
}
