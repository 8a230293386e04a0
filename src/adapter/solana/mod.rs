//! Solana chain adapter
//!
//! Burns and mints go through Circle's v2 Anchor programs. There is no
//! approval step: `deposit_for_burn` burns straight from the owner's
//! associated token account.

pub mod instructions;
pub mod pda;

use alloy_primitives::{Bytes, FixedBytes, U256};
use async_trait::async_trait;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account_client::address::get_associated_token_address;
use spl_associated_token_account_client::instruction::create_associated_token_account_idempotent;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

use self::instructions::{BurnAccounts, DepositForBurnParams, MintAccounts, ReceiveMessageParams};
use self::pda::CctpPdas;
use super::{ApproveOutcome, BurnRequest, ChainAdapter, TxRef};
use crate::chain::{ChainContracts, ChainDescriptor, ChainFamily, ChainRegistry};
use crate::error::{CctpError, Result};
use crate::protocol::recipient::solana_to_word;
use crate::protocol::MessageHeader;
use crate::spans;
use crate::traits::SolanaRpc;

/// 0.01 SOL
pub const SOLANA_MIN_GAS_BALANCE: u64 = 10_000_000;

/// Offset of `fee_recipient` in the TokenMessenger account: 8-byte
/// discriminator, then denylister, owner and pending owner (32 bytes each),
/// message body version (4) and authority bump (1).
const TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET: usize = 109;

/// [`ChainAdapter`] for Solana clusters.
pub struct SolanaAdapter {
    descriptor: ChainDescriptor,
    keypair: Arc<Keypair>,
    rpc: Arc<dyn SolanaRpc>,
    registry: Arc<ChainRegistry>,
    mint: Pubkey,
    pdas: CctpPdas,
}

impl SolanaAdapter {
    /// `registry` resolves the source token of incoming messages.
    pub fn new(
        descriptor: ChainDescriptor,
        keypair: Arc<Keypair>,
        rpc: Arc<dyn SolanaRpc>,
        registry: Arc<ChainRegistry>,
    ) -> Result<Self> {
        let ChainContracts::Solana {
            mint,
            token_messenger_minter,
            message_transmitter,
        } = descriptor.contracts
        else {
            return Err(CctpError::InvalidConfig(format!(
                "{descriptor} is not a Solana chain"
            )));
        };

        Ok(Self {
            pdas: CctpPdas::derive(message_transmitter, token_messenger_minter, &mint),
            descriptor,
            keypair,
            rpc,
            registry,
            mint,
        })
    }

    fn owner_pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn owner_token_account(&self) -> Pubkey {
        get_associated_token_address(&self.owner_pubkey(), &self.mint)
    }

    async fn fee_recipient(&self) -> Result<Pubkey> {
        let data = self
            .rpc
            .get_account_data(&self.pdas.token_messenger)
            .await?
            .ok_or_else(|| {
                CctpError::SolanaRpc(format!(
                    "token messenger account {} not found",
                    self.pdas.token_messenger
                ))
            })?;

        let end = TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET + 32;
        let bytes: [u8; 32] = data
            .get(TOKEN_MESSENGER_FEE_RECIPIENT_OFFSET..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| {
                CctpError::SolanaRpc(format!(
                    "token messenger account is {} bytes, too short for fee recipient",
                    data.len()
                ))
            })?;
        Ok(Pubkey::new_from_array(bytes))
    }

    async fn sign_and_send(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> Result<TxRef> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let payer = self.owner_pubkey();
        let message = Message::new(instructions, Some(&payer));

        let mut signers: Vec<&Keypair> = vec![self.keypair.as_ref()];
        signers.extend_from_slice(extra_signers);

        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_sign(signers.as_slice(), blockhash)
            .map_err(|e| CctpError::SolanaRpc(format!("signing failed: {e}")))?;

        let signature = self.rpc.send_and_confirm_transaction(&transaction).await?;
        Ok(TxRef::from_solana(&signature))
    }
}

fn decode_header(message: &Bytes) -> Result<MessageHeader> {
    MessageHeader::decode(message).ok_or_else(|| {
        CctpError::ContractCall(format!(
            "attested message is not a valid CCTP message ({} bytes)",
            message.len()
        ))
    })
}

fn to_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| CctpError::InvalidIntent(format!("{what} {value} exceeds the Solana u64 range")))
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    fn owner(&self) -> String {
        self.owner_pubkey().to_string()
    }

    fn derive_recipient(&self) -> Result<FixedBytes<32>> {
        Ok(solana_to_word(&self.owner_token_account()))
    }

    fn caller_word(&self) -> FixedBytes<32> {
        solana_to_word(&self.owner_pubkey())
    }

    async fn approve(&self, _amount: U256) -> Result<ApproveOutcome> {
        debug!(chain = %self.descriptor, event = "approval_not_required");
        Ok(ApproveOutcome::NotRequired)
    }

    async fn burn(&self, request: &BurnRequest) -> Result<TxRef> {
        let params = DepositForBurnParams {
            amount: to_u64(request.amount, "amount")?,
            destination_domain: request.destination_domain.as_u32(),
            mint_recipient: request.mint_recipient.0,
            destination_caller: request.destination_caller.0,
            max_fee: to_u64(request.max_fee, "max fee")?,
            min_finality_threshold: request.finality.as_u32(),
        };

        let span = spans::deposit_for_burn(
            &self.descriptor,
            request.destination_domain,
            &request.amount,
            request.finality,
        );

        async {
            let event_account = Keypair::new();
            let accounts = BurnAccounts {
                owner: self.owner_pubkey(),
                burn_token_account: self.owner_token_account(),
                mint: self.mint,
                remote_token_messenger: self
                    .pdas
                    .remote_token_messenger(request.destination_domain),
                message_sent_event_data: event_account.pubkey(),
            };
            let instruction = instructions::deposit_for_burn(&self.pdas, &accounts, &params)?;

            let tx = self.sign_and_send(&[instruction], &[&event_account]).await?;
            info!(
                chain = %self.descriptor,
                signature = %tx,
                message_sent_event_data = %accounts.message_sent_event_data,
                event = "solana_burn_confirmed"
            );
            Ok::<_, CctpError>(tx)
        }
        .instrument(span)
        .await
    }

    async fn mint(&self, message: &Bytes, attestation: &Bytes) -> Result<TxRef> {
        let span = spans::receive_message(&self.descriptor, message.len());

        async {
            let header = decode_header(message)?;

            let source = self
                .registry
                .find_by_domain(
                    header.source_domain,
                    ChainFamily::Evm,
                    self.descriptor.is_testnet,
                )
                .ok_or_else(|| {
                    CctpError::InvalidConfig(format!(
                        "no EVM chain registered for source domain {}",
                        header.source_domain
                    ))
                })?;
            let remote_token = source.token_word();

            let fee_recipient = self.fee_recipient().await?;
            let payer = self.owner_pubkey();
            let recipient_token_account = self.owner_token_account();

            let accounts = MintAccounts {
                payer,
                used_nonce: self.pdas.used_nonce(&header.nonce),
                remote_token_messenger: self.pdas.remote_token_messenger(header.source_domain),
                token_pair: self.pdas.token_pair(header.source_domain, &remote_token),
                fee_recipient_token_account: get_associated_token_address(
                    &fee_recipient,
                    &self.mint,
                ),
                recipient_token_account,
            };
            let params = ReceiveMessageParams {
                message: message.to_vec(),
                attestation: attestation.to_vec(),
            };

            let instructions = [
                create_associated_token_account_idempotent(
                    &payer,
                    &payer,
                    &self.mint,
                    &spl_token::ID,
                ),
                instructions::receive_message(&self.pdas, &accounts, &params)?,
            ];

            let tx = self.sign_and_send(&instructions, &[]).await?;
            info!(
                chain = %self.descriptor,
                signature = %tx,
                source_domain = %header.source_domain,
                event = "solana_mint_confirmed"
            );
            Ok::<_, CctpError>(tx)
        }
        .instrument(span)
        .await
    }

    /// The `used_nonce` account is created by the first successful receive.
    async fn message_received(&self, message: &Bytes) -> Result<bool> {
        let header = decode_header(message)?;
        let used_nonce = self.pdas.used_nonce(&header.nonce);
        Ok(self.rpc.get_account_data(&used_nonce).await?.is_some())
    }

    async fn native_balance(&self) -> Result<U256> {
        Ok(U256::from(self.rpc.get_balance(&self.owner_pubkey()).await?))
    }

    fn min_gas_balance(&self) -> U256 {
        U256::from(SOLANA_MIN_GAS_BALANCE)
    }
}
