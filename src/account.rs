//! Signing identities and per-chain client construction
//!
//! [`ClientFactory`] turns [`Settings`] and the [`ChainRegistry`] into the
//! clients a transfer needs. It decodes credentials lazily, per chain family,
//! so a Solana-only transfer never requires an EVM key and vice versa.

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::signer::Signer;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::adapter::{ChainAdapter, EvmAdapter, SolanaAdapter};
use crate::chain::{ChainDescriptor, ChainFamily, ChainId, ChainRegistry};
use crate::config::{Settings, EVM_PRIVATE_KEY_VAR, SOLANA_PRIVATE_KEY_VAR};
use crate::error::{CctpError, Result};
use crate::provider::DEFAULT_GAS_BUFFER_PERCENT;
use crate::providers::SolanaRpcClient;
use crate::traits::{ChainClients, SolanaRpc};

/// A decoded private key for one chain family.
#[derive(Clone)]
pub enum SigningIdentity {
    Evm(PrivateKeySigner),
    Solana(Arc<Keypair>),
}

impl SigningIdentity {
    /// Parses an EVM private key (hex, with or without `0x`).
    pub fn parse_evm(secret: &str) -> Result<Self> {
        let signer = PrivateKeySigner::from_str(secret.trim()).map_err(|e| {
            CctpError::MalformedCredential {
                family: ChainFamily::Evm,
                reason: e.to_string(),
            }
        })?;
        Ok(Self::Evm(signer))
    }

    /// Parses a Solana secret.
    ///
    /// Accepted forms:
    /// - base58 64-byte keypair (seed followed by public key), as exported by
    ///   wallets
    /// - base58 32-byte seed
    /// - hex 32-byte seed, with or without `0x`
    pub fn parse_solana(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        let malformed = |reason: String| CctpError::MalformedCredential {
            family: ChainFamily::Solana,
            reason,
        };

        let seed_and_pubkey = match bs58::decode(secret).into_vec() {
            Ok(bytes) if bytes.len() == 64 => Some((bytes[..32].to_vec(), Some(bytes[32..].to_vec()))),
            Ok(bytes) if bytes.len() == 32 => Some((bytes, None)),
            _ => None,
        };

        let (seed, expected_pubkey) = match seed_and_pubkey {
            Some(parts) => parts,
            None => {
                let bytes = alloy_primitives::hex::decode(secret)
                    .map_err(|_| malformed("expected a base58 keypair or a 32-byte seed".into()))?;
                if bytes.len() != 32 {
                    return Err(malformed(format!(
                        "hex seed must be 32 bytes, got {}",
                        bytes.len()
                    )));
                }
                (bytes, None)
            }
        };

        let keypair = keypair_from_seed(&seed).map_err(|e| malformed(e.to_string()))?;
        if let Some(expected) = expected_pubkey {
            if keypair.pubkey().to_bytes().as_slice() != expected.as_slice() {
                return Err(malformed("public key half does not match the seed".into()));
            }
        }

        Ok(Self::Solana(Arc::new(keypair)))
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Self::Evm(_) => ChainFamily::Evm,
            Self::Solana(_) => ChainFamily::Solana,
        }
    }

    /// Owner address in the family's native text form.
    pub fn address(&self) -> String {
        match self {
            Self::Evm(signer) => signer.address().to_checksum(None),
            Self::Solana(keypair) => keypair.pubkey().to_string(),
        }
    }

    pub fn evm_address(&self) -> Option<Address> {
        match self {
            Self::Evm(signer) => Some(signer.address()),
            Self::Solana(_) => None,
        }
    }

    pub fn solana_pubkey(&self) -> Option<Pubkey> {
        match self {
            Self::Evm(_) => None,
            Self::Solana(keypair) => Some(keypair.pubkey()),
        }
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(match self {
            Self::Evm(_) => "Evm",
            Self::Solana(_) => "Solana",
        })
        .field(&self.address())
        .finish()
    }
}

/// Read-only client for one chain.
#[derive(Clone)]
pub enum ReadClient {
    Evm(DynProvider),
    Solana(Arc<dyn SolanaRpc>),
}

impl fmt::Debug for ReadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evm(_) => f.write_str("ReadClient::Evm"),
            Self::Solana(_) => f.write_str("ReadClient::Solana"),
        }
    }
}

fn parse_rpc_url(descriptor: &ChainDescriptor) -> Result<url::Url> {
    descriptor.rpc_url.parse().map_err(|e| {
        CctpError::InvalidConfig(format!("RPC URL for {descriptor} is invalid: {e}"))
    })
}

/// HTTP provider that signs with `signer`.
pub fn evm_wallet_provider(signer: PrivateKeySigner, descriptor: &ChainDescriptor) -> Result<DynProvider> {
    let url = parse_rpc_url(descriptor)?;
    Ok(ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url)
        .erased())
}

/// Production [`ChainClients`] built from environment settings.
#[derive(Clone)]
pub struct ClientFactory {
    settings: Settings,
    registry: Arc<ChainRegistry>,
    gas_buffer_percent: u64,
}

impl ClientFactory {
    /// Builds the factory over the default testnet registry, with any
    /// `RPC_URL_<chainId>` overrides applied.
    pub fn new(settings: Settings) -> Self {
        let registry = ChainRegistry::testnet().with_rpc_overrides(settings.rpc_overrides());
        Self::with_registry(settings, registry)
    }

    pub fn with_registry(settings: Settings, registry: ChainRegistry) -> Self {
        Self {
            settings,
            registry: Arc::new(registry),
            gas_buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
        }
    }

    pub fn with_gas_buffer_percent(mut self, percent: u64) -> Self {
        self.gas_buffer_percent = percent;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn solana_rpc(descriptor: &ChainDescriptor) -> Result<Arc<dyn SolanaRpc>> {
        parse_rpc_url(descriptor)?;
        Ok(Arc::new(SolanaRpcClient::new(descriptor.rpc_url.clone())))
    }
}

impl fmt::Debug for ClientFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFactory")
            .field("settings", &self.settings)
            .field("chains", &self.registry.len())
            .field("gas_buffer_percent", &self.gas_buffer_percent)
            .finish()
    }
}

impl ChainClients for ClientFactory {
    fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    fn identity_for(&self, chain_id: ChainId) -> Result<SigningIdentity> {
        match self.registry.resolve_family(chain_id)? {
            ChainFamily::Evm => {
                let secret =
                    self.settings
                        .evm_private_key()
                        .ok_or(CctpError::MissingCredential {
                            family: ChainFamily::Evm,
                            variable: EVM_PRIVATE_KEY_VAR,
                        })?;
                SigningIdentity::parse_evm(secret)
            }
            ChainFamily::Solana => {
                let secret =
                    self.settings
                        .solana_private_key()
                        .ok_or(CctpError::MissingCredential {
                            family: ChainFamily::Solana,
                            variable: SOLANA_PRIVATE_KEY_VAR,
                        })?;
                SigningIdentity::parse_solana(secret)
            }
        }
    }

    fn read_client_for(&self, chain_id: ChainId) -> Result<ReadClient> {
        let descriptor = self.registry.describe(chain_id)?;
        match descriptor.family() {
            ChainFamily::Evm => {
                let url = parse_rpc_url(descriptor)?;
                Ok(ReadClient::Evm(ProviderBuilder::new().connect_http(url).erased()))
            }
            ChainFamily::Solana => Ok(ReadClient::Solana(Self::solana_rpc(descriptor)?)),
        }
    }

    fn adapter_for(&self, chain_id: ChainId) -> Result<Arc<dyn ChainAdapter>> {
        let descriptor = self.registry.describe(chain_id)?.clone();
        let identity = self.identity_for(chain_id)?;
        debug!(
            chain = %descriptor,
            owner = %identity.address(),
            event = "chain_adapter_created"
        );

        match identity {
            SigningIdentity::Evm(signer) => {
                let provider = evm_wallet_provider(signer.clone(), &descriptor)?;
                Ok(Arc::new(EvmAdapter::new(
                    descriptor,
                    signer.address(),
                    provider,
                    self.gas_buffer_percent,
                )?))
            }
            SigningIdentity::Solana(keypair) => {
                let rpc = Self::solana_rpc(&descriptor)?;
                Ok(Arc::new(SolanaAdapter::new(
                    descriptor,
                    keypair,
                    rpc,
                    Arc::clone(&self.registry),
                )?))
            }
        }
    }
}
