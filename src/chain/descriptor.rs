use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, FixedBytes};
use solana_sdk::pubkey::Pubkey;

use crate::protocol::DomainId;

/// Opaque numeric chain key.
///
/// EVM chains use their EIP-155 chain id. Solana clusters use the ids the
/// wallet ecosystem assigns them (101/102/103); these live in a different
/// namespace from CCTP [`DomainId`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM_SEPOLIA: Self = Self(11_155_111);
    pub const AVALANCHE_FUJI: Self = Self(43_113);
    pub const OPTIMISM_SEPOLIA: Self = Self(11_155_420);
    pub const ARBITRUM_SEPOLIA: Self = Self(421_614);
    pub const BASE_SEPOLIA: Self = Self(84_532);
    pub const POLYGON_AMOY: Self = Self(80_002);
    pub const UNICHAIN_SEPOLIA: Self = Self(1_301);
    pub const LINEA_SEPOLIA: Self = Self(59_141);
    pub const CODEX_TESTNET: Self = Self(812_242);
    pub const SONIC_TESTNET: Self = Self(14_601);
    pub const WORLD_CHAIN_SEPOLIA: Self = Self(4_801);
    pub const SEI_TESTNET: Self = Self(1_328);
    pub const XDC_APOTHEM: Self = Self(51);
    pub const HYPEREVM_TESTNET: Self = Self(998);
    pub const INK_SEPOLIA: Self = Self(763_373);
    pub const PLUME_SEPOLIA: Self = Self(98_867);
    pub const ARC_TESTNET: Self = Self(5_042_002);
    pub const SOLANA_MAINNET: Self = Self(102);
    pub const SOLANA_DEVNET: Self = Self(103);

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger family, which decides account model and transaction construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl ChainFamily {
    /// Decimals of the native gas unit (ether, SOL).
    pub const fn native_decimals(self) -> u8 {
        match self {
            Self::Evm => 18,
            Self::Solana => 9,
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evm => f.write_str("EVM"),
            Self::Solana => f.write_str("Solana"),
        }
    }
}

/// Where the user-facing USDC balance of a chain comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSource {
    /// `balanceOf` on the token contract, or the owner's associated token
    /// account on Solana.
    Token { decimals: u8 },
    /// The native gas balance. Used where USDC is the gas token.
    Native { decimals: u8 },
}

impl BalanceSource {
    pub const fn decimals(self) -> u8 {
        match self {
            Self::Token { decimals } | Self::Native { decimals } => decimals,
        }
    }
}

/// Burn/mint entry points and the token for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainContracts {
    Evm {
        token: Address,
        token_messenger: Address,
        message_transmitter: Address,
    },
    Solana {
        mint: Pubkey,
        token_messenger_minter: Pubkey,
        message_transmitter: Pubkey,
    },
}

/// Static description of one supported ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub chain_id: ChainId,
    pub display_name: &'static str,
    pub rpc_url: String,
    pub contracts: ChainContracts,
    /// CCTP domain used to route attestation lookups and burns.
    pub protocol_domain: DomainId,
    pub balance_source: BalanceSource,
    pub is_testnet: bool,
}

impl ChainDescriptor {
    pub fn family(&self) -> ChainFamily {
        match self.contracts {
            ChainContracts::Evm { .. } => ChainFamily::Evm,
            ChainContracts::Solana { .. } => ChainFamily::Solana,
        }
    }

    /// Token contract address or mint pubkey, rendered in the chain's native format.
    pub fn token_address(&self) -> String {
        match &self.contracts {
            ChainContracts::Evm { token, .. } => token.to_checksum(None),
            ChainContracts::Solana { mint, .. } => mint.to_string(),
        }
    }

    pub fn messenger_address(&self) -> String {
        match &self.contracts {
            ChainContracts::Evm {
                token_messenger, ..
            } => token_messenger.to_checksum(None),
            ChainContracts::Solana {
                token_messenger_minter,
                ..
            } => token_messenger_minter.to_string(),
        }
    }

    pub fn transmitter_address(&self) -> String {
        match &self.contracts {
            ChainContracts::Evm {
                message_transmitter,
                ..
            } => message_transmitter.to_checksum(None),
            ChainContracts::Solana {
                message_transmitter,
                ..
            } => message_transmitter.to_string(),
        }
    }

    /// Token address as a 32-byte word, the form CCTP uses for remote tokens.
    pub fn token_word(&self) -> FixedBytes<32> {
        match &self.contracts {
            ChainContracts::Evm { token, .. } => token.into_word(),
            ChainContracts::Solana { mint, .. } => FixedBytes::from(mint.to_bytes()),
        }
    }
}

impl fmt::Display for ChainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_parse_and_display() {
        let id: ChainId = " 84532 ".parse().unwrap();
        assert_eq!(id, ChainId::BASE_SEPOLIA);
        assert_eq!(id.to_string(), "84532");
        assert!("base".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_balance_source_decimals() {
        assert_eq!(BalanceSource::Token { decimals: 6 }.decimals(), 6);
        assert_eq!(BalanceSource::Native { decimals: 18 }.decimals(), 18);
    }

    #[test]
    fn test_family_follows_contracts() {
        let descriptor = ChainDescriptor {
            chain_id: ChainId(1),
            display_name: "Test",
            rpc_url: "http://localhost:8545".into(),
            contracts: ChainContracts::Evm {
                token: Address::repeat_byte(1),
                token_messenger: Address::repeat_byte(2),
                message_transmitter: Address::repeat_byte(3),
            },
            protocol_domain: DomainId::Ethereum,
            balance_source: BalanceSource::Token { decimals: 6 },
            is_testnet: true,
        };
        assert_eq!(descriptor.family(), ChainFamily::Evm);
        assert_eq!(
            descriptor.token_word(),
            Address::repeat_byte(1).into_word()
        );
        assert_eq!(descriptor.to_string(), "Test (1)");
    }
}
