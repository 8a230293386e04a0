//! Program-derived addresses of the CCTP v2 Solana programs.

use alloy_primitives::FixedBytes;
use solana_sdk::pubkey::Pubkey;

use crate::protocol::DomainId;

/// Anchor's event CPI authority seed.
const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

fn pda(seeds: &[&[u8]], program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(seeds, program_id).0
}

/// Accounts shared by burn and mint, derived from the two program ids and
/// the local USDC mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CctpPdas {
    pub message_transmitter_program: Pubkey,
    pub token_messenger_minter_program: Pubkey,
    pub message_transmitter: Pubkey,
    pub token_messenger: Pubkey,
    pub token_minter: Pubkey,
    pub local_token: Pubkey,
    pub custody: Pubkey,
    pub sender_authority: Pubkey,
    pub message_transmitter_event_authority: Pubkey,
    pub token_messenger_event_authority: Pubkey,
}

impl CctpPdas {
    pub fn derive(
        message_transmitter_program: Pubkey,
        token_messenger_minter_program: Pubkey,
        mint: &Pubkey,
    ) -> Self {
        let tmm = &token_messenger_minter_program;
        let mt = &message_transmitter_program;
        Self {
            message_transmitter_program,
            token_messenger_minter_program,
            message_transmitter: pda(&[b"message_transmitter"], mt),
            token_messenger: pda(&[b"token_messenger"], tmm),
            token_minter: pda(&[b"token_minter"], tmm),
            local_token: pda(&[b"local_token", mint.as_ref()], tmm),
            custody: pda(&[b"custody", mint.as_ref()], tmm),
            sender_authority: pda(&[b"sender_authority"], tmm),
            message_transmitter_event_authority: pda(&[EVENT_AUTHORITY_SEED], mt),
            token_messenger_event_authority: pda(&[EVENT_AUTHORITY_SEED], tmm),
        }
    }

    /// Registration of the token messenger on `domain`. The seed is the
    /// domain number as decimal text.
    pub fn remote_token_messenger(&self, domain: DomainId) -> Pubkey {
        pda(
            &[b"remote_token_messenger", domain.seed().as_bytes()],
            &self.token_messenger_minter_program,
        )
    }

    /// Link between the local mint and `remote_token` on `domain`.
    pub fn token_pair(&self, domain: DomainId, remote_token: &FixedBytes<32>) -> Pubkey {
        pda(
            &[
                b"token_pair",
                domain.seed().as_bytes(),
                remote_token.as_slice(),
            ],
            &self.token_messenger_minter_program,
        )
    }

    /// Authority the message transmitter signs with when calling `receiver`.
    pub fn message_transmitter_authority(&self, receiver: &Pubkey) -> Pubkey {
        pda(
            &[b"message_transmitter_authority", receiver.as_ref()],
            &self.message_transmitter_program,
        )
    }

    /// Replay marker for a message nonce.
    pub fn used_nonce(&self, nonce: &FixedBytes<32>) -> Pubkey {
        pda(
            &[b"used_nonce", nonce.as_slice()],
            &self.message_transmitter_program,
        )
    }

    pub fn denylist_account(&self, owner: &Pubkey) -> Pubkey {
        pda(
            &[b"denylist_account", owner.as_ref()],
            &self.token_messenger_minter_program,
        )
    }
}
