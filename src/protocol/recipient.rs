//! 32-byte account words
//!
//! CCTP carries every address (mint recipient, destination caller, remote
//! token) as a `bytes32`. EVM addresses are left-padded with twelve zero
//! bytes; Solana pubkeys already are 32 bytes.

use alloy_primitives::{Address, FixedBytes};
use solana_sdk::pubkey::Pubkey;

use crate::error::{CctpError, Result};

/// Left-pads a 20-byte EVM address to a CCTP word.
#[inline]
pub fn evm_to_word(address: Address) -> FixedBytes<32> {
    address.into_word()
}

/// Recovers the EVM address from a CCTP word.
///
/// Fails if any of the twelve padding bytes is non-zero, which means the
/// word does not hold an EVM address.
pub fn word_to_evm(word: FixedBytes<32>) -> Result<Address> {
    if word[..12].iter().any(|byte| *byte != 0) {
        return Err(CctpError::InvalidAddress(format!(
            "{word} is not a left-padded EVM address"
        )));
    }
    Ok(Address::from_word(word))
}

#[inline]
pub fn solana_to_word(pubkey: &Pubkey) -> FixedBytes<32> {
    FixedBytes::from(pubkey.to_bytes())
}

#[inline]
pub fn word_to_solana(word: FixedBytes<32>) -> Pubkey {
    Pubkey::new_from_array(word.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_evm_word_round_trip() {
        let original = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
        let word = evm_to_word(original);

        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], original.as_slice());
        assert_eq!(word_to_evm(word).unwrap(), original);
    }

    #[test]
    fn test_word_with_dirty_padding_is_rejected() {
        let mut word = evm_to_word(Address::repeat_byte(0xab));
        word[0] = 1;
        assert!(matches!(
            word_to_evm(word),
            Err(CctpError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_solana_word_round_trip() {
        let pubkey = Pubkey::new_from_array([7u8; 32]);
        assert_eq!(word_to_solana(solana_to_word(&pubkey)), pubkey);
    }
}
