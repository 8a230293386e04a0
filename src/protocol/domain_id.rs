//! CCTP domain identifiers
//!
//! The attestation service and the TokenMessenger contracts address chains by
//! a small domain number rather than by chain id. Mainnet and testnet
//! deployments of the same ledger share a domain.
//!
//! Reference: <https://developers.circle.com/cctp/supported-domains>

use std::fmt;

/// CCTP domain identifier
///
/// # Example
///
/// ```rust
/// use cctp_transfer::DomainId;
///
/// assert_eq!(DomainId::Base.as_u32(), 6);
/// assert_eq!(DomainId::from_u32(5), Some(DomainId::Solana));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    /// Ethereum and Sepolia
    Ethereum = 0,
    /// Avalanche C-Chain and Fuji
    Avalanche = 1,
    /// OP Mainnet and OP Sepolia
    Optimism = 2,
    /// Arbitrum One and Arbitrum Sepolia
    Arbitrum = 3,
    /// Solana mainnet-beta and devnet
    Solana = 5,
    /// Base and Base Sepolia
    Base = 6,
    /// Polygon PoS and Amoy
    Polygon = 7,
    Unichain = 10,
    Linea = 11,
    Codex = 12,
    Sonic = 13,
    WorldChain = 14,
    Monad = 15,
    Sei = 16,
    BnbSmartChain = 17,
    Xdc = 18,
    HyperEvm = 19,
    Ink = 21,
    Plume = 22,
    StarknetTestnet = 25,
    /// Arc Testnet, where USDC is the gas token
    ArcTestnet = 26,
}

impl DomainId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            5 => Some(Self::Solana),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            10 => Some(Self::Unichain),
            11 => Some(Self::Linea),
            12 => Some(Self::Codex),
            13 => Some(Self::Sonic),
            14 => Some(Self::WorldChain),
            15 => Some(Self::Monad),
            16 => Some(Self::Sei),
            17 => Some(Self::BnbSmartChain),
            18 => Some(Self::Xdc),
            19 => Some(Self::HyperEvm),
            21 => Some(Self::Ink),
            22 => Some(Self::Plume),
            25 => Some(Self::StarknetTestnet),
            26 => Some(Self::ArcTestnet),
            _ => None,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Solana => "Solana",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Unichain => "Unichain",
            Self::Linea => "Linea",
            Self::Codex => "Codex",
            Self::Sonic => "Sonic",
            Self::WorldChain => "World Chain",
            Self::Monad => "Monad",
            Self::Sei => "Sei",
            Self::BnbSmartChain => "BNB Smart Chain",
            Self::Xdc => "XDC",
            Self::HyperEvm => "HyperEVM",
            Self::Ink => "Ink",
            Self::Plume => "Plume",
            Self::StarknetTestnet => "Starknet Testnet",
            Self::ArcTestnet => "Arc Testnet",
        }
    }

    /// Decimal string form used in Solana PDA seeds (`"6"`, `"26"`).
    pub fn seed(self) -> String {
        self.as_u32().to_string()
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}
