use alloy_primitives::U256;
use std::fmt;
use std::str::FromStr;

use crate::balance::format_units;
use crate::chain::ChainId;
use crate::error::{CctpError, Result};
use crate::protocol::FinalityThreshold;

/// Decimals of USDC on every supported chain.
pub const USDC_DECIMALS: u8 = 6;

/// Transfer speed chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpeedMode {
    /// Soft finality, attested within seconds for a fee
    Fast,
    #[default]
    Standard,
}

impl SpeedMode {
    pub const fn finality(self) -> FinalityThreshold {
        match self {
            Self::Fast => FinalityThreshold::Fast,
            Self::Standard => FinalityThreshold::Standard,
        }
    }
}

impl FromStr for SpeedMode {
    type Err = CctpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "standard" | "slow" => Ok(Self::Standard),
            other => Err(CctpError::InvalidIntent(format!(
                "unknown speed mode '{other}', expected 'fast' or 'standard'"
            ))),
        }
    }
}

impl fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Standard => f.write_str("standard"),
        }
    }
}

/// What to move, from where, to where. Immutable once built.
///
/// # Example
///
/// ```rust
/// use cctp_transfer::{ChainId, SpeedMode, TransferIntent};
/// use alloy_primitives::U256;
///
/// let intent = TransferIntent::new(
///     ChainId::BASE_SEPOLIA,
///     ChainId::SOLANA_DEVNET,
///     "12.5",
///     SpeedMode::Fast,
/// )?;
/// assert_eq!(intent.amount(), U256::from(12_500_000u64));
/// assert_eq!(intent.max_fee(), U256::from(12_499_999u64));
/// # Ok::<(), cctp_transfer::CctpError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    source: ChainId,
    destination: ChainId,
    amount: U256,
    speed: SpeedMode,
}

impl TransferIntent {
    /// Parses `amount` as a decimal USDC amount.
    ///
    /// Source and destination are checked by [`validate`](Self::validate),
    /// which the orchestrator runs before touching any chain.
    pub fn new(
        source: ChainId,
        destination: ChainId,
        amount: &str,
        speed: SpeedMode,
    ) -> Result<Self> {
        Self::from_base_units(source, destination, parse_usdc(amount)?, speed)
    }

    /// `amount` in USDC base units (1 USDC = 1_000_000).
    pub fn from_base_units(
        source: ChainId,
        destination: ChainId,
        amount: U256,
        speed: SpeedMode,
    ) -> Result<Self> {
        if amount.is_zero() {
            return Err(CctpError::InvalidIntent("amount must be positive".into()));
        }
        Ok(Self {
            source,
            destination,
            amount,
            speed,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.source == self.destination {
            return Err(CctpError::InvalidIntent(format!(
                "source and destination are both chain {}",
                self.source
            )));
        }
        if self.amount.is_zero() {
            return Err(CctpError::InvalidIntent("amount must be positive".into()));
        }
        Ok(())
    }

    pub fn source(&self) -> ChainId {
        self.source
    }

    pub fn destination(&self) -> ChainId {
        self.destination
    }

    /// Amount in USDC base units
    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn speed(&self) -> SpeedMode {
        self.speed
    }

    pub fn finality(&self) -> FinalityThreshold {
        self.speed.finality()
    }

    /// Fee cap of the burn: the whole amount less one base unit.
    pub fn max_fee(&self) -> U256 {
        self.amount.saturating_sub(U256::from(1u8))
    }

    /// Amount as decimal USDC, e.g. `"12.5"`
    pub fn display_amount(&self) -> String {
        format_units(self.amount, USDC_DECIMALS)
    }
}

/// Parses a positive decimal USDC amount into base units.
pub fn parse_usdc(amount: &str) -> Result<U256> {
    let invalid = |reason: &str| CctpError::InvalidIntent(format!("amount '{amount}' {reason}"));

    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("is empty"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("is not a decimal number"));
    }
    if fraction.len() > USDC_DECIMALS as usize {
        return Err(invalid("has more than 6 decimal places"));
    }

    let digits = format!(
        "{}{fraction:0<width$}",
        if whole.is_empty() { "0" } else { whole },
        width = USDC_DECIMALS as usize
    );
    let value = U256::from_str_radix(&digits, 10).map_err(|_| invalid("is too large"))?;

    if value.is_zero() {
        return Err(invalid("must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1_000_000)]
    #[case("0.5", 500_000)]
    #[case(".25", 250_000)]
    #[case("12.", 12_000_000)]
    #[case(" 3.141592 ", 3_141_592)]
    #[case("0.000001", 1)]
    fn test_parse_usdc(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(parse_usdc(input).unwrap(), U256::from(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("0")]
    #[case("0.000000")]
    #[case("-1")]
    #[case("1e6")]
    #[case("1.0000001")]
    #[case("1,5")]
    fn test_parse_usdc_rejects(#[case] input: &str) {
        assert!(matches!(parse_usdc(input), Err(CctpError::InvalidIntent(_))));
    }

    #[test]
    fn test_same_chain_fails_validation() {
        let intent = TransferIntent::new(
            ChainId::BASE_SEPOLIA,
            ChainId::BASE_SEPOLIA,
            "1",
            SpeedMode::Standard,
        )
        .unwrap();
        let err = intent.validate().unwrap_err();
        insta::assert_snapshot!(
            err,
            @"Invalid transfer intent: source and destination are both chain 84532"
        );
    }

    #[test]
    fn test_speed_mode_maps_to_finality() {
        assert_eq!(SpeedMode::Fast.finality().as_u32(), 1000);
        assert_eq!(SpeedMode::Standard.finality().as_u32(), 2000);
        assert_eq!("FAST".parse::<SpeedMode>().unwrap(), SpeedMode::Fast);
        assert!("instant".parse::<SpeedMode>().is_err());
    }

    #[test]
    fn test_max_fee_of_one_unit_is_zero() {
        let intent = TransferIntent::from_base_units(
            ChainId::SOLANA_DEVNET,
            ChainId::ARC_TESTNET,
            U256::from(1u8),
            SpeedMode::Fast,
        )
        .unwrap();
        assert_eq!(intent.max_fee(), U256::ZERO);
        assert_eq!(intent.display_amount(), "0.000001");
    }
}
