//! Runtime record of one transfer
//!
//! The log is append-only. Every entry is also emitted as a `tracing` event
//! so the session shows up in regular logs without extra wiring.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::intent::TransferIntent;
use super::phase::TransferPhase;
use crate::adapter::TxRef;
use crate::error::{CctpError, Result};
use crate::protocol::AttestationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// The session entered a new phase
    Transition,
    Progress,
    /// A failed attempt that will be repeated
    Retry,
    /// Something failed without affecting the transfer outcome
    Warning,
    /// The failure that moved the session to `Error`
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    /// Phase the session was in when the entry was written
    pub phase: TransferPhase,
    pub kind: LogKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.phase,
            self.message
        )
    }
}

/// State of one transfer: its phase, log, and what it produced so far.
///
/// Sessions are created and mutated only by the
/// [`TransferOrchestrator`](super::TransferOrchestrator); callers get
/// read-only snapshots.
#[derive(Debug, Clone)]
pub struct TransferSession {
    intent: TransferIntent,
    phase: TransferPhase,
    log: Vec<LogEntry>,
    last_error: Option<String>,
    approval_tx: Option<TxRef>,
    burn_tx: Option<TxRef>,
    attestation: Option<AttestationRecord>,
    mint_tx: Option<TxRef>,
    reward_tx: Option<TxRef>,
}

impl TransferSession {
    pub fn new(intent: TransferIntent) -> Self {
        Self {
            intent,
            phase: TransferPhase::Idle,
            log: Vec::new(),
            last_error: None,
            approval_tx: None,
            burn_tx: None,
            attestation: None,
            mint_tx: None,
            reward_tx: None,
        }
    }

    pub fn intent(&self) -> &TransferIntent {
        &self.intent
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn approval_tx(&self) -> Option<&TxRef> {
        self.approval_tx.as_ref()
    }

    pub fn burn_tx(&self) -> Option<&TxRef> {
        self.burn_tx.as_ref()
    }

    pub fn attestation(&self) -> Option<&AttestationRecord> {
        self.attestation.as_ref()
    }

    pub fn mint_tx(&self) -> Option<&TxRef> {
        self.mint_tx.as_ref()
    }

    pub fn reward_tx(&self) -> Option<&TxRef> {
        self.reward_tx.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == TransferPhase::Completed
    }

    /// Phases entered, in log order.
    pub fn phases_visited(&self) -> Vec<TransferPhase> {
        self.entries_of(LogKind::Transition)
            .map(|entry| entry.phase)
            .collect()
    }

    pub fn entries_of(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.log.iter().filter(move |entry| entry.kind == kind)
    }

    pub(crate) fn advance(&mut self, to: TransferPhase) -> Result<()> {
        if !self.phase.can_advance_to(to) {
            return Err(CctpError::InvalidTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }
        self.phase = to;
        self.push(LogKind::Transition, format!("Entered {to}"));
        Ok(())
    }

    /// Moves the session to `Error` with `error` as the last error.
    ///
    /// A terminal session only gets the log entry.
    pub(crate) fn fail(&mut self, error: &CctpError) {
        let message = error.to_string();
        if !self.phase.is_terminal() {
            self.phase = TransferPhase::Error;
        }
        self.last_error = Some(message.clone());
        self.push(LogKind::Failure, message);
    }

    pub(crate) fn push(&mut self, kind: LogKind, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            phase: self.phase,
            kind,
            message: message.into(),
        };

        match kind {
            LogKind::Failure => error!(
                phase = %entry.phase,
                message = %entry.message,
                event = "transfer_failed"
            ),
            LogKind::Retry | LogKind::Warning => warn!(
                phase = %entry.phase,
                message = %entry.message,
                event = "transfer_warning"
            ),
            LogKind::Transition | LogKind::Progress => info!(
                phase = %entry.phase,
                message = %entry.message,
                event = "transfer_log"
            ),
        }

        self.log.push(entry);
    }

    pub(crate) fn set_approval_tx(&mut self, tx: TxRef) {
        self.approval_tx = Some(tx);
    }

    pub(crate) fn set_burn_tx(&mut self, tx: TxRef) {
        self.burn_tx = Some(tx);
    }

    pub(crate) fn set_attestation(&mut self, record: AttestationRecord) {
        self.attestation = Some(record);
    }

    pub(crate) fn set_mint_tx(&mut self, tx: TxRef) {
        self.mint_tx = Some(tx);
    }

    pub(crate) fn set_reward_tx(&mut self, tx: TxRef) {
        self.reward_tx = Some(tx);
    }
}

/// Live, read-only view of a session while it executes.
///
/// # Example
///
/// ```rust,no_run
/// # use cctp_transfer::{SessionHandle, TransferIntent};
/// # async fn example(intent: TransferIntent) {
/// let (publisher, mut handle) = SessionHandle::channel(intent);
/// // hand `publisher` to `TransferOrchestrator::execute_transfer_with`;
/// // the loop ends when the transfer drops it
/// # drop(publisher);
/// while handle.changed().await {
///     if let Some(entry) = handle.snapshot().log().last() {
///         println!("{entry}");
///     }
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<TransferSession>,
}

impl SessionHandle {
    /// A fresh `Idle` session for `intent` and the sender that publishes its
    /// updates.
    pub fn channel(intent: TransferIntent) -> (watch::Sender<TransferSession>, Self) {
        let (sender, receiver) = watch::channel(TransferSession::new(intent));
        (sender, Self { receiver })
    }

    pub fn snapshot(&self) -> TransferSession {
        self.receiver.borrow().clone()
    }

    pub fn phase(&self) -> TransferPhase {
        self.receiver.borrow().phase()
    }

    /// Waits for the next update. Returns `false` once the publisher is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Waits until the publisher is gone and returns the final session.
    ///
    /// A session turns terminal before the reward hook logs its outcome, so
    /// this outlives [`TransferSession::is_terminal`].
    pub async fn wait_until_finished(&mut self) -> TransferSession {
        while self.receiver.changed().await.is_ok() {}
        self.snapshot()
    }
}
