// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Attestation polling
//!
//! [`AttestationPoller`] asks the attestation service about a burn until the
//! first message of the response is complete. How long to wait between
//! attempts, when to give up, and which errors are survivable all come from
//! an [`AttestationPolicy`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use crate::adapter::TxRef;
use crate::config::{AttestationPolicy, PollDecision};
use crate::error::{CctpError, Result};
use crate::protocol::{AttestationRecord, AttestationStatus, DomainId};
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Why the poller is waiting another interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollWait {
    /// The service does not know the transaction yet (HTTP 404).
    NotIndexed,
    /// The response carried no message entries.
    NoMessages,
    /// Indexed but not attested yet.
    Status(AttestationStatus),
    /// Marked complete but `message` or `attestation` is still missing.
    Incomplete,
}

impl PollWait {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::NotIndexed => "burn not indexed yet",
            Self::NoMessages => "no messages yet",
            Self::Status(AttestationStatus::PendingConfirmations) => "pending confirmations",
            Self::Status(_) => "attestation pending",
            Self::Incomplete => "attestation incomplete",
        }
    }
}

/// One unsuccessful poll, reported before the poller sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    /// 1-based request count
    pub attempt: u32,
    pub wait: PollWait,
    pub next_poll_in: Duration,
}

pub struct AttestationPoller<'a, A: ?Sized, C: ?Sized> {
    provider: &'a A,
    clock: &'a C,
    policy: AttestationPolicy,
}

impl<'a, A, C> AttestationPoller<'a, A, C>
where
    A: AttestationProvider + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(provider: &'a A, clock: &'a C, policy: AttestationPolicy) -> Self {
        Self {
            provider,
            clock,
            policy,
        }
    }

    /// Polls until the burn `tx` on `source_domain` is attested.
    ///
    /// # Errors
    ///
    /// - [`CctpError::AttestationFailed`] if the service reports the message
    ///   as failed
    /// - any error the policy classifies as [`PollDecision::Abort`]
    /// - [`CctpError::AttestationTimeout`] once `max_wait` has elapsed
    /// - [`CctpError::Cancelled`] if `cancel` fires between attempts
    pub async fn poll(
        &self,
        source_domain: DomainId,
        tx: &TxRef,
        cancel: &CancellationToken,
    ) -> Result<AttestationRecord> {
        self.poll_observed(source_domain, tx, cancel, |_| {}).await
    }

    /// Like [`poll`](Self::poll), calling `on_wait` after every attempt that
    /// did not yield a complete attestation.
    pub async fn poll_observed<F>(
        &self,
        source_domain: DomainId,
        tx: &TxRef,
        cancel: &CancellationToken,
        on_wait: F,
    ) -> Result<AttestationRecord>
    where
        F: FnMut(PollProgress),
    {
        let span = spans::poll_attestation(
            source_domain,
            tx,
            self.policy.poll_interval.as_secs(),
        );
        self.poll_loop(source_domain, tx, cancel, on_wait)
            .instrument(span)
            .await
    }

    async fn poll_loop<F>(
        &self,
        source_domain: DomainId,
        tx: &TxRef,
        cancel: &CancellationToken,
        mut on_wait: F,
    ) -> Result<AttestationRecord>
    where
        F: FnMut(PollProgress),
    {
        let started = self.clock.now();
        let interval = self.policy.poll_interval;
        let mut attempt = 0u32;

        info!(
            source_domain = %source_domain,
            tx = %tx,
            event = "attestation_polling_started"
        );

        loop {
            if cancel.is_cancelled() {
                return Err(CctpError::Cancelled);
            }

            attempt += 1;
            tracing::Span::current().record("attempts", attempt);

            let wait = match self.provider.get_messages(source_domain, tx).await {
                Ok(response) => match response.first_message() {
                    Some(message) if message.status == AttestationStatus::Failed => {
                        spans::record_error_with_context(
                            "AttestationFailed",
                            "Attestation service returned failed status",
                            Some("The burn transaction may have reverted"),
                        );
                        error!(attempt = attempt, event = "attestation_failed");
                        return Err(CctpError::AttestationFailed {
                            reason: format!("message for {tx} marked failed"),
                        });
                    }
                    Some(message) => match message.to_record() {
                        Some(record) => {
                            info!(
                                attempt = attempt,
                                message_length_bytes = record.message.len(),
                                attestation_length_bytes = record.attestation.len(),
                                event = "attestation_complete"
                            );
                            return Ok(record);
                        }
                        None if message.status == AttestationStatus::Complete => {
                            PollWait::Incomplete
                        }
                        None => PollWait::Status(message.status),
                    },
                    None => PollWait::NoMessages,
                },
                Err(e) => match (self.policy.classify)(&e) {
                    PollDecision::Retry => PollWait::NotIndexed,
                    PollDecision::Abort => {
                        spans::record_error(&e);
                        error!(
                            error = %e,
                            attempt = attempt,
                            event = "attestation_request_failed"
                        );
                        return Err(e);
                    }
                },
            };

            let waited = self.clock.now().saturating_duration_since(started);
            if let Some(max_wait) = self.policy.max_wait {
                if waited >= max_wait {
                    spans::record_error_with_context(
                        "AttestationTimeout",
                        &format!("No attestation after {attempt} attempts"),
                        Some(&format!("Waited {} seconds", waited.as_secs())),
                    );
                    error!(
                        attempts = attempt,
                        waited_secs = waited.as_secs(),
                        event = "attestation_timeout"
                    );
                    return Err(CctpError::AttestationTimeout {
                        waited_secs: waited.as_secs(),
                    });
                }
            }

            debug!(
                attempt = attempt,
                reason = wait.describe(),
                next_poll_secs = interval.as_secs(),
                event = "attestation_pending"
            );
            on_wait(PollProgress {
                attempt,
                wait,
                next_poll_in: interval,
            });

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(CctpError::Cancelled),
                _ = self.clock.sleep(interval) => {}
            }
        }
    }
}
