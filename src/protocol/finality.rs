//! CCTP v2 finality thresholds
//!
//! A burn carries the minimum finality the attestation service must observe
//! before it signs the message. Lower thresholds attest sooner.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use std::fmt;

/// Finality a burn asks the attesters to wait for
///
/// ```rust
/// use cctp_transfer::FinalityThreshold;
///
/// assert_eq!(FinalityThreshold::Fast.as_u32(), 1000);
/// assert_eq!(FinalityThreshold::Standard.to_string(), "Standard Transfer (2000)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FinalityThreshold {
    /// Confirmed blocks; attested in seconds, may charge a fee
    Fast = 1000,
    /// Finalized blocks
    #[default]
    Standard = 2000,
}

impl FinalityThreshold {
    /// Value passed as `minFinalityThreshold`
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fast => "Fast Transfer",
            Self::Standard => "Standard Transfer",
        }
    }
}

impl fmt::Display for FinalityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_default() {
        assert_eq!(FinalityThreshold::default(), FinalityThreshold::Standard);
        insta::assert_snapshot!(FinalityThreshold::Fast, @"Fast Transfer (1000)");
    }
}
