// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use bon::Builder;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Instrument, Span};

use super::intent::TransferIntent;
use super::phase::TransferPhase;
use super::session::{LogKind, TransferSession};
use crate::adapter::{ApproveOutcome, BurnRequest, ChainAdapter, TxRef};
use crate::balance::format_units;
use crate::config::{AttestationPolicy, MintRetryPolicy};
use crate::error::{CctpError, Result};
use crate::hooks::RewardHook;
use crate::poller::AttestationPoller;
use crate::protocol::AttestationRecord;
use crate::spans;
use crate::traits::{AttestationProvider, ChainClients, Clock};

/// Drives transfers through approve, burn, attestation and mint.
///
/// The orchestrator is generic over its collaborators so tests can run it
/// against fakes from [`crate::testing`].
///
/// # Example
///
/// ```rust,no_run
/// use cctp_transfer::{
///     ChainId, ClientFactory, IrisAttestationProvider, Settings, SpeedMode, TokioClock,
///     TransferIntent, TransferOrchestrator,
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings::from_env()?;
/// let attestation_provider = IrisAttestationProvider::new(settings.iris_api_url());
///
/// let orchestrator = TransferOrchestrator::builder()
///     .clients(ClientFactory::new(settings))
///     .attestation_provider(attestation_provider)
///     .clock(TokioClock::new())
///     .build();
///
/// let intent = TransferIntent::new(
///     ChainId::BASE_SEPOLIA,
///     ChainId::SOLANA_DEVNET,
///     "1.5",
///     SpeedMode::Fast,
/// )?;
/// let session = orchestrator
///     .execute_transfer(intent, &CancellationToken::new())
///     .await;
///
/// for entry in session.log() {
///     println!("{entry}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct TransferOrchestrator<F, A, C>
where
    F: ChainClients,
    A: AttestationProvider,
    C: Clock,
{
    clients: F,
    attestation_provider: A,
    clock: C,

    #[builder(default)]
    attestation_policy: AttestationPolicy,

    #[builder(default)]
    mint_retry: MintRetryPolicy,

    /// Runs after completed transfers into the chain it applies to
    reward_hook: Option<Arc<dyn RewardHook>>,
}

/// Publishes every change of the session being executed.
struct Tracker<'a> {
    progress: &'a watch::Sender<TransferSession>,
    span: Span,
}

impl Tracker<'_> {
    fn advance(&self, to: TransferPhase) -> Result<()> {
        let mut outcome = Ok(());
        self.progress.send_modify(|session| outcome = session.advance(to));
        if outcome.is_ok() {
            self.span.record("phase", to.as_str());
        }
        outcome
    }

    fn log(&self, kind: LogKind, message: impl Into<String>) {
        let message = message.into();
        self.progress.send_modify(|session| session.push(kind, message));
    }

    fn update(&self, apply: impl FnOnce(&mut TransferSession)) {
        self.progress.send_modify(apply);
    }

    fn fail(&self, error: &CctpError) {
        self.span.in_scope(|| spans::record_error(error));
        self.span.record("phase", TransferPhase::Error.as_str());
        self.progress.send_modify(|session| session.fail(error));
    }
}

impl<F, A, C> TransferOrchestrator<F, A, C>
where
    F: ChainClients,
    A: AttestationProvider,
    C: Clock,
{
    pub fn clients(&self) -> &F {
        &self.clients
    }

    /// Executes `intent` and returns the finished session.
    ///
    /// Failures do not surface as `Err`: the returned session is in
    /// [`TransferPhase::Error`] with [`last_error`](TransferSession::last_error)
    /// set and the failure appended to its log.
    pub async fn execute_transfer(
        &self,
        intent: TransferIntent,
        cancel: &CancellationToken,
    ) -> TransferSession {
        let (progress, _) = watch::channel(TransferSession::new(intent.clone()));
        self.execute_transfer_with(intent, cancel, progress).await
    }

    /// Executes `intent`, publishing the session through `progress` as it
    /// changes.
    ///
    /// The channel's value is replaced with a fresh session for `intent`
    /// before anything else happens. `progress` is dropped once the reward
    /// hook has run, which is how watchers learn that no entries follow. See
    /// [`SessionHandle::channel`](super::SessionHandle::channel).
    pub async fn execute_transfer_with(
        &self,
        intent: TransferIntent,
        cancel: &CancellationToken,
        progress: watch::Sender<TransferSession>,
    ) -> TransferSession {
        progress.send_replace(TransferSession::new(intent.clone()));

        let span = spans::execute_transfer(
            intent.source(),
            intent.destination(),
            &intent.amount(),
            intent.finality(),
        );
        let tracker = Tracker {
            progress: &progress,
            span: span.clone(),
        };

        if let Err(e) = self.run(&intent, cancel, &tracker).instrument(span).await {
            tracker.fail(&e);
        }

        progress.borrow().clone()
    }

    async fn run(
        &self,
        intent: &TransferIntent,
        cancel: &CancellationToken,
        tracker: &Tracker<'_>,
    ) -> Result<()> {
        // Everything that can be checked without the network is checked
        // before the first transaction.
        intent.validate()?;
        let source = self.clients.adapter_for(intent.source())?;
        let destination = self.clients.adapter_for(intent.destination())?;

        let source_domain = source.descriptor().protocol_domain;
        let destination_domain = destination.descriptor().protocol_domain;
        if source_domain == destination_domain {
            return Err(CctpError::InvalidIntent(format!(
                "{} and {} share CCTP domain {source_domain}",
                source.descriptor(),
                destination.descriptor()
            )));
        }
        if source.descriptor().is_testnet != destination.descriptor().is_testnet {
            return Err(CctpError::InvalidIntent(format!(
                "{} and {} are on different networks; testnet and mainnet cannot be mixed",
                source.descriptor(),
                destination.descriptor()
            )));
        }

        let request = BurnRequest {
            amount: intent.amount(),
            destination_domain,
            mint_recipient: destination.derive_recipient()?,
            destination_caller: destination.caller_word(),
            max_fee: intent.max_fee(),
            finality: intent.finality(),
        };

        info!(
            source_chain = %source.descriptor(),
            destination_chain = %destination.descriptor(),
            amount = %intent.amount(),
            max_fee = %request.max_fee,
            finality_threshold = %request.finality,
            event = "transfer_started"
        );
        tracker.log(
            LogKind::Progress,
            format!(
                "Transferring {} USDC from {} to {} ({} transfer)",
                intent.display_amount(),
                source.descriptor(),
                destination.descriptor(),
                intent.speed()
            ),
        );

        // Approve
        ensure_active(cancel)?;
        tracker.advance(TransferPhase::Approving)?;
        let approval = source
            .approve(intent.amount())
            .await
            .map_err(|e| CctpError::ApprovalFailed {
                reason: e.to_string(),
            })?;
        match approval {
            ApproveOutcome::Submitted(tx) => {
                tracker.log(LogKind::Progress, format!("Approval confirmed: {tx}"));
                tracker.update(|session| session.set_approval_tx(tx));
            }
            ApproveOutcome::NotRequired => tracker.log(
                LogKind::Progress,
                format!(
                    "No explicit approval needed on {}",
                    source.descriptor().display_name
                ),
            ),
        }

        // Burn
        ensure_active(cancel)?;
        tracker.advance(TransferPhase::Burning)?;
        tracker.log(
            LogKind::Progress,
            format!(
                "Burning on {} for domain {destination_domain}, recipient {}",
                source.descriptor().display_name,
                request.mint_recipient
            ),
        );
        let burn_tx = source
            .burn(&request)
            .await
            .map_err(|e| CctpError::BurnFailed {
                reason: e.to_string(),
            })?;
        tracker.log(LogKind::Progress, format!("Burn confirmed: {burn_tx}"));
        tracker.update(|session| session.set_burn_tx(burn_tx.clone()));

        // Attest
        ensure_active(cancel)?;
        tracker.advance(TransferPhase::WaitingAttestation)?;
        let poller = AttestationPoller::new(
            &self.attestation_provider,
            &self.clock,
            self.attestation_policy,
        );
        let record = poller
            .poll_observed(source_domain, &burn_tx, cancel, |progress| {
                tracker.log(
                    LogKind::Progress,
                    format!(
                        "Attempt {}: {}, next check in {}s",
                        progress.attempt,
                        progress.wait.describe(),
                        progress.next_poll_in.as_secs()
                    ),
                )
            })
            .await?;
        tracker.log(
            LogKind::Progress,
            format!(
                "Attestation complete ({} byte message)",
                record.message.len()
            ),
        );
        tracker.update(|session| session.set_attestation(record.clone()));

        // Mint
        ensure_active(cancel)?;
        tracker.advance(TransferPhase::Minting)?;
        self.ensure_gas(destination.as_ref(), tracker).await?;
        let mint_tx = self
            .mint_with_retry(destination.as_ref(), &record, tracker)
            .await?;
        tracker.log(LogKind::Progress, format!("Mint confirmed: {mint_tx}"));
        tracker.update(|session| session.set_mint_tx(mint_tx.clone()));

        tracker.advance(TransferPhase::Completed)?;
        info!(
            burn_tx = %burn_tx,
            mint_tx = %mint_tx,
            event = "transfer_completed"
        );

        self.run_reward_hook(intent, destination.as_ref(), tracker)
            .await;
        Ok(())
    }

    async fn ensure_gas(&self, destination: &dyn ChainAdapter, tracker: &Tracker<'_>) -> Result<()> {
        let balance = destination.native_balance().await?;
        let required = destination.min_gas_balance();
        let decimals = destination.descriptor().family().native_decimals();

        if balance < required {
            return Err(CctpError::InsufficientGasBalance {
                chain: destination.descriptor().to_string(),
                balance: format_units(balance, decimals),
                required: format_units(required, decimals),
            });
        }

        tracker.log(
            LogKind::Progress,
            format!(
                "Gas balance {} on {}",
                format_units(balance, decimals),
                destination.descriptor().display_name
            ),
        );
        Ok(())
    }

    /// Retries transient failures with linearly growing delays.
    ///
    /// Once a mint has been broadcast without confirmation, every later
    /// failure first asks the destination whether the message was received,
    /// so a mint that landed is never reported as failed.
    async fn mint_with_retry(
        &self,
        destination: &dyn ChainAdapter,
        record: &AttestationRecord,
        tracker: &Tracker<'_>,
    ) -> Result<TxRef> {
        let mut retries = 0u32;
        let mut broadcast: Option<TxRef> = None;

        loop {
            let error = match destination.mint(&record.message, &record.attestation).await {
                Ok(tx) => return Ok(tx),
                Err(e) => e,
            };

            if let Some(tx) = error.broadcast_tx() {
                broadcast = Some(tx.clone());
            }
            if let Some(tx) = &broadcast {
                match destination.message_received(&record.message).await {
                    Ok(true) => {
                        info!(mint_tx = %tx, error = %error, event = "mint_landed_unconfirmed");
                        tracker.log(
                            LogKind::Progress,
                            format!(
                                "Mint {tx} was received on {} although its confirmation failed",
                                destination.descriptor().display_name
                            ),
                        );
                        return Ok(tx.clone());
                    }
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, event = "message_received_check_failed"),
                }
            }

            match error {
                e if e.is_transient() && retries < self.mint_retry.max_retries => {
                    retries += 1;
                    let delay = self.mint_retry.delay_for(retries);
                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = self.mint_retry.max_retries,
                        delay_secs = delay.as_secs(),
                        event = "mint_retry_scheduled"
                    );
                    tracker.log(
                        LogKind::Retry,
                        format!(
                            "Mint attempt {retries} failed: {e}; retry {retries}/{} in {}s",
                            self.mint_retry.max_retries,
                            delay.as_secs()
                        ),
                    );
                    self.clock.sleep(delay).await;
                }
                e => {
                    return Err(CctpError::MintFailed {
                        attempts: retries + 1,
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    /// Never fails the transfer: errors end up as a warning in the log.
    async fn run_reward_hook(
        &self,
        intent: &TransferIntent,
        destination: &dyn ChainAdapter,
        tracker: &Tracker<'_>,
    ) {
        let Some(hook) = &self.reward_hook else {
            return;
        };
        if !hook.applies_to(intent.destination()) {
            return;
        }

        tracker.log(
            LogKind::Progress,
            format!(
                "Buying carbon offsets with {} USDC",
                intent.display_amount()
            ),
        );

        let outcome = match self.clients.identity_for(intent.destination()) {
            Ok(identity) => {
                hook.mint_loyalty_credit(destination.descriptor(), &identity, intent.amount())
                    .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(tx) => {
                tracker.log(LogKind::Progress, format!("Carbon offset credit minted: {tx}"));
                tracker.update(|session| session.set_reward_tx(tx));
            }
            Err(e) => {
                let e = match e {
                    CctpError::SecondaryHookFailed { .. } => e,
                    other => CctpError::SecondaryHookFailed {
                        reason: other.to_string(),
                    },
                };
                warn!(error = %e, event = "reward_hook_failed");
                tracker.log(LogKind::Warning, e.to_string());
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CctpError::Cancelled);
    }
    Ok(())
}
