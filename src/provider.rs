// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! EVM transaction helpers.
//!
//! Gas estimation with a safety buffer, and a send-and-wait helper that sorts
//! failures into the error kinds the transfer retry policy understands.

use crate::adapter::TxRef;
use crate::error::{CctpError, Result};
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use tracing::{debug, info, warn};

/// Default gas buffer percentage (20%)
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 20;

/// Estimate gas for a transaction with an optional safety buffer.
///
/// Adds `buffer_percent` (default 20%) on top of the node's estimate to
/// avoid out-of-gas failures on CCTP mints, whose cost depends on state the
/// estimate may not see.
///
/// An estimation failure usually means the call would revert (bad
/// attestation, nonce already used), so it is reported as
/// [`CctpError::ContractCall`] and not retried.
///
/// # Example
///
/// ```rust,ignore
/// use cctp_transfer::provider::estimate_gas_with_buffer;
///
/// let gas_limit = estimate_gas_with_buffer(&provider, &tx, Some(20)).await?;
/// let tx = tx.with_gas_limit(gas_limit);
/// ```
pub async fn estimate_gas_with_buffer<P: Provider<Ethereum>>(
    provider: &P,
    tx: &TransactionRequest,
    buffer_percent: Option<u64>,
) -> Result<u64> {
    let buffer = buffer_percent.unwrap_or(DEFAULT_GAS_BUFFER_PERCENT);

    let estimate = provider
        .estimate_gas(tx.clone())
        .await
        .map_err(|e| CctpError::ContractCall(format!("Gas estimation failed: {e}")))?;

    Ok(apply_gas_buffer(estimate, buffer))
}

/// `estimate * (100 + buffer) / 100`, saturating.
pub fn apply_gas_buffer(estimate: u64, buffer_percent: u64) -> u64 {
    estimate.saturating_mul(100 + buffer_percent) / 100
}

/// Sends a transaction and waits for its receipt.
///
/// - a send failure is [`CctpError::TransactionExecution`]: nothing reached
///   the mempool and the same call can be submitted again
/// - a receipt-wait failure is [`CctpError::TransactionUnconfirmed`]
///   carrying the hash, since the transaction may still be mined
/// - a mined but reverted transaction is [`CctpError::TransactionFailed`]
pub async fn send_and_confirm<P: Provider<Ethereum>>(
    provider: &P,
    tx: TransactionRequest,
    label: &'static str,
) -> Result<TxHash> {
    let pending = provider.send_transaction(tx).await.map_err(|e| {
        warn!(label = label, error = %e, event = "transaction_send_failed");
        CctpError::TransactionExecution {
            reason: format!("{label}: {e}"),
        }
    })?;

    let tx_hash = *pending.tx_hash();
    debug!(label = label, tx_hash = %tx_hash, event = "transaction_submitted");

    let receipt = pending.get_receipt().await.map_err(|e| {
        warn!(label = label, tx_hash = %tx_hash, error = %e, event = "receipt_wait_failed");
        CctpError::TransactionUnconfirmed {
            tx: TxRef::from_evm(tx_hash),
            reason: format!("{label}: {e}"),
        }
    })?;

    if !receipt.status() {
        return Err(CctpError::TransactionFailed {
            reason: format!("{label} {tx_hash} reverted"),
        });
    }

    info!(
        label = label,
        tx_hash = %tx_hash,
        block_number = ?receipt.block_number(),
        event = "transaction_confirmed"
    );

    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100_000, 20, 120_000)]
    #[case(100_000, 0, 100_000)]
    #[case(21_000, 50, 31_500)]
    #[case(u64::MAX, 20, u64::MAX / 100)]
    fn test_apply_gas_buffer(#[case] estimate: u64, #[case] buffer: u64, #[case] expected: u64) {
        assert_eq!(apply_gas_buffer(estimate, buffer), expected);
    }
}
