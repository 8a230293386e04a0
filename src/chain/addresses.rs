// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Contract addresses and program ids for CCTP v2 across the supported testnets
//!
//! CCTP v2 deploys TokenMessengerV2 and MessageTransmitterV2 at the same address
//! on every EVM testnet, so only the USDC token address differs per chain.

use alloy_primitives::{address, Address};
use solana_sdk::pubkey::Pubkey;

// CCTP v2 EVM contracts (shared by all testnets)

/// <https://developers.circle.com/cctp/evm-smart-contracts>
pub const CCTP_V2_TOKEN_MESSENGER_TESTNET: Address =
    address!("8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");

/// <https://developers.circle.com/cctp/evm-smart-contracts>
pub const CCTP_V2_MESSAGE_TRANSMITTER_TESTNET: Address =
    address!("E737e5cEBEEBa77EFE34D4aa090756590b1CE275");

// USDC token addresses

pub const ETHEREUM_SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
pub const AVALANCHE_FUJI_USDC: Address = address!("5425890298aed601595a70AB815c96711a31Bc65");
pub const OPTIMISM_SEPOLIA_USDC: Address = address!("5fd84259d66Cd46123540766Be93DFE6D43130D7");
pub const ARBITRUM_SEPOLIA_USDC: Address = address!("75faf114eafb1BDbe2F0316DF893fd58CE46AA4d");
pub const BASE_SEPOLIA_USDC: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");
pub const POLYGON_AMOY_USDC: Address = address!("41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582");
pub const UNICHAIN_SEPOLIA_USDC: Address = address!("31d0220469e10c4E71834a79b1f276d740d3768F");
pub const LINEA_SEPOLIA_USDC: Address = address!("FEce4462D57bD51A6A552365A011b95f0E16d9B7");
pub const CODEX_TESTNET_USDC: Address = address!("6d7f141b6819C2c9CC2f818e6ad549E7Ca090F8f");
pub const SONIC_TESTNET_USDC: Address = address!("0BA304580ee7c9a980CF72e55f5Ed2E9fd30Bc51");
pub const WORLD_CHAIN_SEPOLIA_USDC: Address =
    address!("66145f38cBAC35Ca6F1Dfb4914dF98F1614aeA88");
pub const SEI_TESTNET_USDC: Address = address!("4fCF1784B31630811181f670Aea7A7bEF803eaED");
pub const XDC_APOTHEM_USDC: Address = address!("b5AB69F7bBada22B28e79C8FFAECe55eF1c771D4");
pub const HYPEREVM_TESTNET_USDC: Address = address!("2B3370eE501B4a559b57D449569354196457D8Ab");
pub const INK_SEPOLIA_USDC: Address = address!("FabaB97dCE620294D2B0b0e46C68964e326300Ac");
pub const PLUME_SEPOLIA_USDC: Address = address!("cB5f30e335672893c7eb944B374c196392C19D18");

/// Arc Testnet exposes USDC as the native gas token through this ERC20 facade.
pub const ARC_TESTNET_USDC: Address = address!("3600000000000000000000000000000000000000");

// Arc Testnet reward contracts

/// Offset manager that sells carbon offset points for USDC.
pub const ARC_OFFSET_MANAGER: Address = address!("5d3E23605b0D5D1E9069AcE697Fa6ccEf8625F1E");

// Solana programs and mints

/// CCTP v2 TokenMessengerMinter program
pub const SOLANA_TOKEN_MESSENGER_MINTER_V2: Pubkey =
    solana_sdk::pubkey!("CCTPV2vPZJS2u2BBsUoscuikbYjnpFmbFsvVuJdgUMQe");

/// CCTP v2 MessageTransmitter program
pub const SOLANA_MESSAGE_TRANSMITTER_V2: Pubkey =
    solana_sdk::pubkey!("CCTPV2Sm4AdWt5296sk4P66VBZ7bEhcARwFaaS9YPbeC");

pub const SOLANA_DEVNET_USDC: Pubkey =
    solana_sdk::pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");

pub const SOLANA_MAINNET_USDC: Pubkey =
    solana_sdk::pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
