//! Transfer state machine
//!
//! A transfer runs `Idle → Approving → Burning → WaitingAttestation →
//! Minting → Completed`, or stops in `Error`. [`TransferOrchestrator`] drives
//! the phases through [`ChainAdapter`](crate::ChainAdapter)s and records
//! everything in a [`TransferSession`].

mod intent;
mod orchestrator;
mod phase;
mod session;

pub use intent::{parse_usdc, SpeedMode, TransferIntent, USDC_DECIMALS};
pub use orchestrator::TransferOrchestrator;
pub use phase::TransferPhase;
pub use session::{LogEntry, LogKind, SessionHandle, TransferSession};
