//! Solana JSON-RPC client implementation.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::fmt;
use tracing::{debug, instrument};

use crate::adapter::TxRef;
use crate::error::{CctpError, Result};
use crate::traits::SolanaRpc;

/// [`SolanaRpc`] over the nonblocking `solana-client` RPC client at
/// `confirmed` commitment.
pub struct SolanaRpcClient {
    client: RpcClient,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()),
        }
    }
}

impl fmt::Debug for SolanaRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaRpcClient")
            .field("url", &self.client.url())
            .finish()
    }
}

#[async_trait]
impl SolanaRpc for SolanaRpcClient {
    #[instrument(skip(self), fields(address = %address))]
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| CctpError::SolanaRpc(e.to_string()))?;

        debug!(exists = response.value.is_some(), "Account fetched");
        Ok(response.value.map(|account| account.data))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| CctpError::SolanaRpc(e.to_string()))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| CctpError::SolanaRpc(e.to_string()))
    }

    /// Sends, then polls for confirmation.
    ///
    /// A rejected preflight is [`CctpError::TransactionFailed`] or
    /// [`CctpError::TransactionExecution`]; once the signature is out, a lost
    /// confirmation is [`CctpError::TransactionUnconfirmed`].
    #[instrument(skip_all)]
    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let signature = self
            .client
            .send_transaction(transaction)
            .await
            .map_err(|e| match e.get_transaction_error() {
                // simulated and rejected by the runtime
                Some(tx_error) => CctpError::TransactionFailed {
                    reason: tx_error.to_string(),
                },
                None => CctpError::TransactionExecution {
                    reason: e.to_string(),
                },
            })?;
        debug!(signature = %signature, event = "transaction_sent");

        self.client
            .poll_for_signature_with_commitment(&signature, self.client.commitment())
            .await
            .map_err(|e| match e.get_transaction_error() {
                Some(tx_error) => CctpError::TransactionFailed {
                    reason: tx_error.to_string(),
                },
                None => CctpError::TransactionUnconfirmed {
                    tx: TxRef::from_solana(&signature),
                    reason: e.to_string(),
                },
            })?;
        Ok(signature)
    }
}
