use std::fmt;

/// Phase of a transfer session.
///
/// Phases only move forward, one step at a time, through
/// `Idle → Approving → Burning → WaitingAttestation → Minting → Completed`.
/// `Error` can be entered from any phase that is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferPhase {
    #[default]
    Idle,
    Approving,
    Burning,
    WaitingAttestation,
    Minting,
    Completed,
    Error,
}

impl TransferPhase {
    /// The successful path, in order.
    pub const SEQUENCE: [Self; 6] = [
        Self::Idle,
        Self::Approving,
        Self::Burning,
        Self::WaitingAttestation,
        Self::Minting,
        Self::Completed,
    ];

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// The phase after `self` on the successful path.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Approving),
            Self::Approving => Some(Self::Burning),
            Self::Burning => Some(Self::WaitingAttestation),
            Self::WaitingAttestation => Some(Self::Minting),
            Self::Minting => Some(Self::Completed),
            Self::Completed | Self::Error => None,
        }
    }

    pub fn can_advance_to(self, to: Self) -> bool {
        match to {
            Self::Error => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Approving => "APPROVING",
            Self::Burning => "BURNING",
            Self::WaitingAttestation => "WAITING_ATTESTATION",
            Self::Minting => "MINTING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sequence_is_a_chain_of_next() {
        for pair in TransferPhase::SEQUENCE.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0].can_advance_to(pair[1]));
        }
    }

    #[rstest]
    #[case(TransferPhase::Idle, TransferPhase::Burning)]
    #[case(TransferPhase::Burning, TransferPhase::Approving)]
    #[case(TransferPhase::Minting, TransferPhase::Minting)]
    #[case(TransferPhase::Completed, TransferPhase::Error)]
    #[case(TransferPhase::Error, TransferPhase::Error)]
    #[case(TransferPhase::Error, TransferPhase::Idle)]
    fn test_rejected_transitions(#[case] from: TransferPhase, #[case] to: TransferPhase) {
        assert!(!from.can_advance_to(to));
    }

    #[test]
    fn test_error_reachable_from_every_non_terminal_phase() {
        for phase in &TransferPhase::SEQUENCE[..5] {
            assert!(phase.can_advance_to(TransferPhase::Error), "{phase}");
        }
    }
}
