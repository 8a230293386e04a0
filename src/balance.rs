//! USDC balance lookups
//!
//! Balances are read with the chain's read client and rendered as decimal
//! text in whole-token units, e.g. `"12.5"`.

use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account_client::address::get_associated_token_address;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Account as TokenAccount;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::account::ReadClient;
use crate::chain::{BalanceSource, ChainContracts, ChainId};
use crate::contracts::Erc20Contract;
use crate::error::{CctpError, Result};
use crate::traits::ChainClients;

/// Reads USDC balances for any registered chain.
pub struct BalanceOracle<'a, F: ?Sized> {
    clients: &'a F,
}

impl<'a, F: ChainClients + ?Sized> BalanceOracle<'a, F> {
    pub fn new(clients: &'a F) -> Self {
        Self { clients }
    }

    /// Balance of `owner` on `chain_id`.
    ///
    /// A Solana owner without an associated token account holds `"0"`.
    #[instrument(skip(self), fields(chain = %chain_id))]
    pub async fn balance_of(&self, chain_id: ChainId, owner: &str) -> Result<String> {
        let descriptor = self.clients.registry().describe(chain_id)?;
        let decimals = descriptor.balance_source.decimals();

        let raw = match (self.clients.read_client_for(chain_id)?, &descriptor.contracts) {
            (ReadClient::Evm(provider), ChainContracts::Evm { token, .. }) => {
                let owner = Address::from_str(owner.trim())
                    .map_err(|e| CctpError::InvalidAddress(format!("{owner}: {e}")))?;
                match descriptor.balance_source {
                    BalanceSource::Token { .. } => Erc20Contract::new(*token, provider)
                        .balance_of(owner)
                        .await
                        .map_err(|e| CctpError::ContractCall(e.to_string()))?,
                    BalanceSource::Native { .. } => provider.get_balance(owner).await?,
                }
            }
            (ReadClient::Solana(rpc), ChainContracts::Solana { mint, .. }) => {
                let owner = Pubkey::from_str(owner.trim())
                    .map_err(|e| CctpError::InvalidAddress(format!("{owner}: {e}")))?;
                let token_account = get_associated_token_address(&owner, mint);
                match rpc.get_account_data(&token_account).await? {
                    Some(data) => U256::from(token_account_amount(&data)?),
                    None => {
                        debug!(token_account = %token_account, event = "token_account_missing");
                        U256::ZERO
                    }
                }
            }
            _ => {
                return Err(CctpError::InvalidConfig(format!(
                    "read client does not match the family of {descriptor}"
                )))
            }
        };

        Ok(format_units(raw, decimals))
    }

    /// Balance of the configured signing identity on `chain_id`.
    pub async fn own_balance(&self, chain_id: ChainId) -> Result<String> {
        let owner = self.clients.identity_for(chain_id)?.address();
        self.balance_of(chain_id, &owner).await
    }
}

fn token_account_amount(data: &[u8]) -> Result<u64> {
    TokenAccount::unpack(data)
        .map(|account| account.amount)
        .map_err(|e| {
            CctpError::SolanaRpc(format!("invalid token account ({} bytes): {e}", data.len()))
        })
}

/// Renders `value` base units as a decimal with trailing zeros removed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / scale;
    let fraction = value % scale;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let digits = format!("{fraction:0>width$}", width = decimals as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::addresses::SOLANA_DEVNET_USDC;
    use crate::testing::FakeChainClients;
    use rstest::rstest;

    #[rstest]
    #[case(0, 6, "0")]
    #[case(1_500_000, 6, "1.5")]
    #[case(1, 6, "0.000001")]
    #[case(12_340_000, 6, "12.34")]
    #[case(1_000_000_000_000_000_000, 18, "1")]
    #[case(250_000_000_000_000_000, 18, "0.25")]
    fn test_format_units(#[case] raw: u128, #[case] decimals: u8, #[case] expected: &str) {
        assert_eq!(format_units(U256::from(raw), decimals), expected);
    }

    fn token_account(owner: Pubkey, amount: u64) -> Vec<u8> {
        let account = TokenAccount {
            mint: SOLANA_DEVNET_USDC,
            owner,
            amount,
            state: spl_token::state::AccountState::Initialized,
            ..TokenAccount::default()
        };
        let mut data = vec![0u8; TokenAccount::LEN];
        account.pack_into_slice(&mut data);
        data
    }

    #[tokio::test]
    async fn test_solana_missing_token_account_is_zero() {
        let clients = FakeChainClients::testnet();
        let oracle = BalanceOracle::new(&clients);
        let owner = Pubkey::new_from_array([5u8; 32]).to_string();

        let balance = oracle.balance_of(ChainId::SOLANA_DEVNET, &owner).await.unwrap();
        assert_eq!(balance, "0");
    }

    #[tokio::test]
    async fn test_solana_token_account_amount() {
        let clients = FakeChainClients::testnet();
        let owner = Pubkey::new_from_array([5u8; 32]);
        clients.solana_rpc().set_account(
            get_associated_token_address(&owner, &SOLANA_DEVNET_USDC),
            token_account(owner, 7_250_000),
        );

        let oracle = BalanceOracle::new(&clients);
        let balance = oracle
            .balance_of(ChainId::SOLANA_DEVNET, &owner.to_string())
            .await
            .unwrap();
        assert_eq!(balance, "7.25");
    }

    #[tokio::test]
    async fn test_invalid_owner_and_unknown_chain() {
        let clients = FakeChainClients::testnet();
        let oracle = BalanceOracle::new(&clients);

        assert!(matches!(
            oracle.balance_of(ChainId::SOLANA_DEVNET, "0xnot-a-pubkey").await,
            Err(CctpError::InvalidAddress(_))
        ));
        assert!(matches!(
            oracle.balance_of(ChainId(1), "anything").await,
            Err(CctpError::UnknownChain(_))
        ));
    }

    #[rstest]
    #[case::truncated(vec![0u8; 10])]
    #[case::uninitialized(vec![0u8; TokenAccount::LEN])]
    fn test_malformed_token_account(#[case] data: Vec<u8>) {
        assert!(matches!(
            token_account_amount(&data),
            Err(CctpError::SolanaRpc(_))
        ));
    }
}
