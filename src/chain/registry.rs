// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Process-wide registry of supported chains.

use std::collections::HashMap;

use alloy_primitives::Address;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use super::addresses::*;
use super::{BalanceSource, ChainContracts, ChainDescriptor, ChainFamily, ChainId};
use crate::error::{CctpError, Result};
use crate::protocol::DomainId;

/// Read-only lookup table from [`ChainId`] to [`ChainDescriptor`].
///
/// Built once at startup (optionally with RPC overrides) and shared behind an
/// `Arc`; there is no mutation API.
///
/// # Example
///
/// ```rust
/// use cctp_transfer::{ChainFamily, ChainId, ChainRegistry};
///
/// let registry = ChainRegistry::testnet();
/// let base = registry.describe(ChainId::BASE_SEPOLIA).unwrap();
/// assert_eq!(base.protocol_domain.as_u32(), 6);
/// assert_eq!(
///     registry.resolve_family(ChainId::SOLANA_DEVNET).unwrap(),
///     ChainFamily::Solana
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainDescriptor>,
}

impl ChainRegistry {
    /// Builds a registry from an explicit descriptor list.
    ///
    /// Later entries with the same chain id replace earlier ones.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ChainDescriptor>) -> Self {
        let chains = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.chain_id, descriptor))
            .collect();
        Self { chains }
    }

    /// The CCTP v2 testnet table plus Solana mainnet.
    pub fn testnet() -> Self {
        Self::from_descriptors(default_descriptors())
    }

    /// Replaces the RPC endpoint of the listed chains.
    ///
    /// Overrides naming chains the registry does not know are ignored.
    pub fn with_rpc_overrides(mut self, overrides: &HashMap<ChainId, String>) -> Self {
        for (chain_id, url) in overrides {
            if let Some(descriptor) = self.chains.get_mut(chain_id) {
                debug!(
                    chain_id = %chain_id,
                    rpc_url = %url,
                    event = "rpc_override_applied"
                );
                descriptor.rpc_url = url.clone();
            }
        }
        self
    }

    pub fn describe(&self, chain_id: ChainId) -> Result<&ChainDescriptor> {
        self.chains
            .get(&chain_id)
            .ok_or(CctpError::UnknownChain(chain_id))
    }

    pub fn resolve_family(&self, chain_id: ChainId) -> Result<ChainFamily> {
        self.describe(chain_id).map(ChainDescriptor::family)
    }

    /// Finds the chain of `family` that uses `domain`, matching the testnet flag.
    ///
    /// Used on the mint side to recover the source token of a message.
    pub fn find_by_domain(
        &self,
        domain: DomainId,
        family: ChainFamily,
        is_testnet: bool,
    ) -> Option<&ChainDescriptor> {
        self.chains.values().find(|descriptor| {
            descriptor.protocol_domain == domain
                && descriptor.family() == family
                && descriptor.is_testnet == is_testnet
        })
    }

    /// All descriptors sorted by chain id.
    pub fn chains(&self) -> Vec<&ChainDescriptor> {
        let mut chains: Vec<_> = self.chains.values().collect();
        chains.sort_by_key(|descriptor| descriptor.chain_id);
        chains
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::testnet()
    }
}

fn evm_testnet(
    chain_id: ChainId,
    display_name: &'static str,
    rpc_url: &str,
    token: Address,
    protocol_domain: DomainId,
) -> ChainDescriptor {
    ChainDescriptor {
        chain_id,
        display_name,
        rpc_url: rpc_url.to_string(),
        contracts: ChainContracts::Evm {
            token,
            token_messenger: CCTP_V2_TOKEN_MESSENGER_TESTNET,
            message_transmitter: CCTP_V2_MESSAGE_TRANSMITTER_TESTNET,
        },
        protocol_domain,
        balance_source: BalanceSource::Token { decimals: 6 },
        is_testnet: true,
    }
}

fn solana(
    chain_id: ChainId,
    display_name: &'static str,
    rpc_url: &str,
    mint: Pubkey,
    is_testnet: bool,
) -> ChainDescriptor {
    ChainDescriptor {
        chain_id,
        display_name,
        rpc_url: rpc_url.to_string(),
        contracts: ChainContracts::Solana {
            mint,
            token_messenger_minter: SOLANA_TOKEN_MESSENGER_MINTER_V2,
            message_transmitter: SOLANA_MESSAGE_TRANSMITTER_V2,
        },
        protocol_domain: DomainId::Solana,
        balance_source: BalanceSource::Token { decimals: 6 },
        is_testnet,
    }
}

fn default_descriptors() -> Vec<ChainDescriptor> {
    let mut arc = evm_testnet(
        ChainId::ARC_TESTNET,
        "Arc Testnet",
        "https://rpc.testnet.arc.network",
        ARC_TESTNET_USDC,
        DomainId::ArcTestnet,
    );
    // USDC is the gas token on Arc; the native balance carries 18 decimals.
    arc.balance_source = BalanceSource::Native { decimals: 18 };

    vec![
        evm_testnet(
            ChainId::ETHEREUM_SEPOLIA,
            "Ethereum Sepolia",
            "https://ethereum-sepolia-rpc.publicnode.com",
            ETHEREUM_SEPOLIA_USDC,
            DomainId::Ethereum,
        ),
        evm_testnet(
            ChainId::AVALANCHE_FUJI,
            "Avalanche Fuji",
            "https://api.avax-test.network/ext/bc/C/rpc",
            AVALANCHE_FUJI_USDC,
            DomainId::Avalanche,
        ),
        evm_testnet(
            ChainId::OPTIMISM_SEPOLIA,
            "OP Sepolia",
            "https://sepolia.optimism.io",
            OPTIMISM_SEPOLIA_USDC,
            DomainId::Optimism,
        ),
        evm_testnet(
            ChainId::ARBITRUM_SEPOLIA,
            "Arbitrum Sepolia",
            "https://sepolia-rollup.arbitrum.io/rpc",
            ARBITRUM_SEPOLIA_USDC,
            DomainId::Arbitrum,
        ),
        evm_testnet(
            ChainId::BASE_SEPOLIA,
            "Base Sepolia",
            "https://sepolia.base.org",
            BASE_SEPOLIA_USDC,
            DomainId::Base,
        ),
        evm_testnet(
            ChainId::POLYGON_AMOY,
            "Polygon Amoy",
            "https://rpc-amoy.polygon.technology",
            POLYGON_AMOY_USDC,
            DomainId::Polygon,
        ),
        evm_testnet(
            ChainId::UNICHAIN_SEPOLIA,
            "Unichain Sepolia",
            "https://sepolia.unichain.org",
            UNICHAIN_SEPOLIA_USDC,
            DomainId::Unichain,
        ),
        evm_testnet(
            ChainId::LINEA_SEPOLIA,
            "Linea Sepolia",
            "https://rpc.sepolia.linea.build",
            LINEA_SEPOLIA_USDC,
            DomainId::Linea,
        ),
        evm_testnet(
            ChainId::CODEX_TESTNET,
            "Codex Testnet",
            "https://812242.rpc.thirdweb.com",
            CODEX_TESTNET_USDC,
            DomainId::Codex,
        ),
        evm_testnet(
            ChainId::SONIC_TESTNET,
            "Sonic Testnet",
            "https://rpc.testnet.soniclabs.com",
            SONIC_TESTNET_USDC,
            DomainId::Sonic,
        ),
        evm_testnet(
            ChainId::WORLD_CHAIN_SEPOLIA,
            "World Chain Sepolia",
            "https://worldchain-sepolia.g.alchemy.com/public",
            WORLD_CHAIN_SEPOLIA_USDC,
            DomainId::WorldChain,
        ),
        evm_testnet(
            ChainId::SEI_TESTNET,
            "Sei Testnet",
            "https://evm-rpc-testnet.sei-apis.com",
            SEI_TESTNET_USDC,
            DomainId::Sei,
        ),
        evm_testnet(
            ChainId::XDC_APOTHEM,
            "XDC Apothem",
            "https://erpc.apothem.network",
            XDC_APOTHEM_USDC,
            DomainId::Xdc,
        ),
        evm_testnet(
            ChainId::HYPEREVM_TESTNET,
            "HyperEVM Testnet",
            "https://rpc.hyperliquid-testnet.xyz/evm",
            HYPEREVM_TESTNET_USDC,
            DomainId::HyperEvm,
        ),
        evm_testnet(
            ChainId::INK_SEPOLIA,
            "Ink Sepolia",
            "https://rpc-gel-sepolia.inkonchain.com",
            INK_SEPOLIA_USDC,
            DomainId::Ink,
        ),
        evm_testnet(
            ChainId::PLUME_SEPOLIA,
            "Plume Sepolia",
            "https://testnet-rpc.plume.org",
            PLUME_SEPOLIA_USDC,
            DomainId::Plume,
        ),
        arc,
        solana(
            ChainId::SOLANA_DEVNET,
            "Solana Devnet",
            "https://api.devnet.solana.com",
            SOLANA_DEVNET_USDC,
            true,
        ),
        solana(
            ChainId::SOLANA_MAINNET,
            "Solana Mainnet",
            "https://api.mainnet-beta.solana.com",
            SOLANA_MAINNET_USDC,
            false,
        ),
    ]
}
