//! OpenTelemetry-style span helpers for transfer operations
//!
//! Static span names, structured attributes and error fields that are filled
//! in after the fact with [`record_error`] or [`record_error_with_context`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cctp_transfer::{spans, ChainId, DomainId, TxRef};
//!
//! let tx = TxRef::new("0xabc");
//! let span = spans::poll_attestation(DomainId::Ethereum, &tx, 5);
//! let _guard = span.enter();
//! // custom polling here
//! ```

use alloy_primitives::U256;
use tracing::Span;

use crate::adapter::TxRef;
use crate::chain::{ChainDescriptor, ChainId};
use crate::error::CctpError;
use crate::protocol::{DomainId, FinalityThreshold};

/// Top-level span of one transfer.
///
/// Children: poll_attestation, deposit_for_burn, receive_message
#[inline]
pub fn execute_transfer(
    source_chain: ChainId,
    destination_chain: ChainId,
    amount: &U256,
    finality: FinalityThreshold,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.execute_transfer",
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        amount = %amount,
        finality = finality.name(),
        phase = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for polling the attestation service until the burn is attested.
///
/// Parent: cctp_transfer.execute_transfer
#[inline]
pub fn poll_attestation(source_domain: DomainId, tx: &TxRef, poll_interval_secs: u64) -> Span {
    tracing::info_span!(
        "cctp_transfer.poll_attestation",
        source_domain = %source_domain,
        tx = %tx,
        poll_interval_secs = poll_interval_secs,
        attempts = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for a burn on the source chain.
///
/// Parent: cctp_transfer.execute_transfer
/// Children: Provider RPC calls
#[inline]
pub fn deposit_for_burn(
    source: &ChainDescriptor,
    destination_domain: DomainId,
    amount: &U256,
    finality: FinalityThreshold,
) -> Span {
    tracing::info_span!(
        "cctp_transfer.deposit_for_burn",
        source_chain = %source,
        destination_domain = %destination_domain,
        amount = %amount,
        min_finality_threshold = finality.as_u32(),
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Span for a mint on the destination chain.
///
/// Parent: cctp_transfer.execute_transfer
/// Children: Provider RPC calls
#[inline]
pub fn receive_message(destination: &ChainDescriptor, message_length: usize) -> Span {
    tracing::info_span!(
        "cctp_transfer.receive_message",
        destination_chain = %destination,
        message_length_bytes = message_length,
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error variant
/// - error.message: Human-readable error message
pub fn record_error(error: &CctpError) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error.kind());
    current_span.record("error.message", error.to_string());
    current_span.record("otel.status_code", "ERROR");
}

/// Record an error that has no [`CctpError`] yet, such as a poll timeout.
///
/// ```rust,no_run
/// use cctp_transfer::spans;
///
/// let span = tracing::info_span!("cctp_transfer.poll_attestation", error.type = tracing::field::Empty);
/// span.in_scope(|| {
///     spans::record_error_with_context(
///         "AttestationTimeout",
///         "no attestation after 600s",
///         Some("burn may still be awaiting finality"),
///     )
/// });
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
