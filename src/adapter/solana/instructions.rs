//! Anchor instruction encoding for the CCTP v2 Solana programs.
//!
//! Instruction data is the 8-byte Anchor discriminator,
//! `sha256("global:<name>")[..8]`, followed by the borsh-encoded arguments.

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_system_interface::program as system_program;

use super::pda::CctpPdas;
use crate::error::{CctpError, Result};

pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

fn anchor_data<T: BorshSerialize>(name: &str, args: &T) -> Result<Vec<u8>> {
    let mut data = anchor_discriminator(name).to_vec();
    args.serialize(&mut data)
        .map_err(|e| CctpError::SolanaRpc(format!("encoding {name} arguments: {e}")))?;
    Ok(data)
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct DepositForBurnParams {
    pub amount: u64,
    pub destination_domain: u32,
    pub mint_recipient: [u8; 32],
    pub destination_caller: [u8; 32],
    pub max_fee: u64,
    pub min_finality_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct ReceiveMessageParams {
    pub message: Vec<u8>,
    pub attestation: Vec<u8>,
}

/// Accounts of a burn that are not fixed by the program ids.
#[derive(Debug, Clone)]
pub struct BurnAccounts {
    pub owner: Pubkey,
    pub burn_token_account: Pubkey,
    pub mint: Pubkey,
    pub remote_token_messenger: Pubkey,
    /// Fresh keypair that stores the emitted message; must sign.
    pub message_sent_event_data: Pubkey,
}

pub fn deposit_for_burn(
    pdas: &CctpPdas,
    accounts: &BurnAccounts,
    params: &DepositForBurnParams,
) -> Result<Instruction> {
    let tmm = pdas.token_messenger_minter_program;
    Ok(Instruction {
        program_id: tmm,
        accounts: vec![
            AccountMeta::new_readonly(accounts.owner, true),
            AccountMeta::new(accounts.owner, true),
            AccountMeta::new_readonly(pdas.sender_authority, false),
            AccountMeta::new(accounts.burn_token_account, false),
            AccountMeta::new_readonly(pdas.denylist_account(&accounts.owner), false),
            AccountMeta::new(pdas.message_transmitter, false),
            AccountMeta::new_readonly(pdas.token_messenger, false),
            AccountMeta::new_readonly(accounts.remote_token_messenger, false),
            AccountMeta::new_readonly(pdas.token_minter, false),
            AccountMeta::new(pdas.local_token, false),
            AccountMeta::new(accounts.mint, false),
            AccountMeta::new(accounts.message_sent_event_data, true),
            AccountMeta::new_readonly(pdas.message_transmitter_program, false),
            AccountMeta::new_readonly(tmm, false),
            AccountMeta::new_readonly(spl_token::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(pdas.token_messenger_event_authority, false),
            AccountMeta::new_readonly(tmm, false),
        ],
        data: anchor_data("deposit_for_burn", params)?,
    })
}

/// Accounts of a mint that depend on the message being received.
#[derive(Debug, Clone)]
pub struct MintAccounts {
    pub payer: Pubkey,
    pub used_nonce: Pubkey,
    pub remote_token_messenger: Pubkey,
    pub token_pair: Pubkey,
    pub fee_recipient_token_account: Pubkey,
    pub recipient_token_account: Pubkey,
}

pub fn receive_message(
    pdas: &CctpPdas,
    accounts: &MintAccounts,
    params: &ReceiveMessageParams,
) -> Result<Instruction> {
    let mt = pdas.message_transmitter_program;
    let tmm = pdas.token_messenger_minter_program;

    let mut metas = vec![
        AccountMeta::new(accounts.payer, true),
        AccountMeta::new_readonly(accounts.payer, true),
        AccountMeta::new_readonly(pdas.message_transmitter_authority(&tmm), false),
        AccountMeta::new_readonly(pdas.message_transmitter, false),
        AccountMeta::new(accounts.used_nonce, false),
        AccountMeta::new_readonly(tmm, false),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(pdas.message_transmitter_event_authority, false),
        AccountMeta::new_readonly(mt, false),
    ];
    // forwarded to the token messenger's handle_receive_message
    metas.extend([
        AccountMeta::new_readonly(pdas.token_messenger, false),
        AccountMeta::new_readonly(accounts.remote_token_messenger, false),
        AccountMeta::new(pdas.token_minter, false),
        AccountMeta::new(pdas.local_token, false),
        AccountMeta::new_readonly(accounts.token_pair, false),
        AccountMeta::new(accounts.fee_recipient_token_account, false),
        AccountMeta::new(accounts.recipient_token_account, false),
        AccountMeta::new(pdas.custody, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(pdas.token_messenger_event_authority, false),
        AccountMeta::new_readonly(tmm, false),
    ]);

    Ok(Instruction {
        program_id: mt,
        accounts: metas,
        data: anchor_data("receive_message", params)?,
    })
}
