//! Test utilities and fake implementations of the transfer trait seams.
//!
//! These fakes let tests drive [`TransferOrchestrator`](crate::TransferOrchestrator)
//! through adversarial scenarios (slow attestation, flaky mints, empty gas
//! wallets) without touching a blockchain or Circle's API.

use alloy_primitives::{Bytes, FixedBytes, U256};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::keypair_from_seed;
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::account::{ReadClient, SigningIdentity};
use crate::adapter::{ApproveOutcome, BurnRequest, ChainAdapter, TxRef};
use crate::chain::{ChainDescriptor, ChainFamily, ChainId, ChainRegistry};
use crate::hooks::RewardHook;
use crate::protocol::recipient::evm_to_word;
use crate::protocol::{AttestationStatus, DomainId, V2AttestationResponse, V2Message};
use crate::traits::{AttestationProvider, ChainClients, Clock, SolanaRpc};
use crate::{CctpError, Result};

// Well-known anvil account 0
const TEST_EVM_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcad5e784d7bf4f2ff";
const TEST_SOLANA_SEED: [u8; 32] = [42u8; 32];

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted answer of [`FakeAttestationProvider`].
#[derive(Debug, Clone)]
pub enum FakeAttestation {
    /// HTTP 404: the burn is not indexed yet
    NotFound,
    /// Indexed, attestation not ready
    Pending,
    Complete { message: Bytes, attestation: Bytes },
    Failed,
    /// Any other HTTP error status
    Transport(u16),
}

impl FakeAttestation {
    fn respond(&self) -> Result<V2AttestationResponse> {
        let message = |status, message: Option<Bytes>, attestation: Option<Bytes>| {
            Ok(V2AttestationResponse {
                messages: vec![V2Message {
                    status,
                    message,
                    attestation,
                }],
            })
        };

        match self {
            Self::NotFound => Err(CctpError::AttestationPending),
            Self::Pending => message(AttestationStatus::Pending, None, None),
            Self::Complete {
                message: bytes,
                attestation,
            } => message(
                AttestationStatus::Complete,
                Some(bytes.clone()),
                Some(attestation.clone()),
            ),
            Self::Failed => message(AttestationStatus::Failed, None, None),
            Self::Transport(status) => Err(CctpError::AttestationTransport {
                status: *status,
                reason: "scripted failure".into(),
            }),
        }
    }
}

/// A fake attestation provider that replays a scripted sequence of answers.
///
/// Once the script is exhausted the last answer repeats, so an
/// "always pending" provider is a one-element script.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    script: Arc<Mutex<Vec<FakeAttestation>>>,
    requests: Arc<Mutex<Vec<(DomainId, TxRef)>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<FakeAttestation>) -> Self {
        let provider = Self::new();
        *provider.script.lock().unwrap() = script;
        provider
    }

    /// `not_found` 404s followed by a complete attestation.
    pub fn not_found_then_complete(not_found: usize, message: Bytes, attestation: Bytes) -> Self {
        let mut script = vec![FakeAttestation::NotFound; not_found];
        script.push(FakeAttestation::Complete {
            message,
            attestation,
        });
        Self::with_script(script)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(DomainId, TxRef)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx: &TxRef,
    ) -> Result<V2AttestationResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((source_domain, tx.clone()));
            requests.len() - 1
        };

        let script = self.script.lock().unwrap();
        match script.get(index).or_else(|| script.last()) {
            Some(answer) => answer.respond(),
            None => Err(CctpError::AttestationPending),
        }
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Every duration passed to `sleep`, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }

    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}

// ============================================================================
// Fake Chain Adapter
// ============================================================================

/// Scripted result of one adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeOutcome {
    Success,
    /// Fails with a retryable execution error
    Transient,
    /// Fails with a non-retryable error
    Fatal,
    /// Broadcast, but the confirmation is lost. `landed` says whether the
    /// transaction took effect anyway.
    Unconfirmed { landed: bool },
}

impl FakeOutcome {
    fn into_result(self, operation: &str, tx: TxRef) -> Result<TxRef> {
        match self {
            Self::Success => Ok(tx),
            Self::Transient => Err(CctpError::TransactionExecution {
                reason: format!("{operation}: nonce too low"),
            }),
            Self::Fatal => Err(CctpError::TransactionFailed {
                reason: format!("{operation}: execution reverted"),
            }),
            Self::Unconfirmed { .. } => Err(CctpError::TransactionUnconfirmed {
                tx,
                reason: format!("{operation}: receipt timed out"),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct AdapterState {
    approve: VecDeque<FakeOutcome>,
    burn: VecDeque<FakeOutcome>,
    mint: VecDeque<FakeOutcome>,
    calls: Vec<&'static str>,
    burn_requests: Vec<BurnRequest>,
    minted: Vec<(Bytes, Bytes)>,
    received: bool,
}

/// A chain adapter that records calls and replays scripted outcomes.
///
/// Unscripted calls succeed. Approval mirrors the chain family: EVM adapters
/// submit an approval, Solana adapters report it as not required. Once a mint
/// has landed the message counts as received, and later mints revert the way
/// a used nonce does on chain.
#[derive(Clone, Debug)]
pub struct FakeChainAdapter {
    descriptor: ChainDescriptor,
    native_balance: Arc<Mutex<U256>>,
    min_gas_balance: U256,
    state: Arc<Mutex<AdapterState>>,
}

impl FakeChainAdapter {
    /// An adapter with ample gas for `descriptor`.
    pub fn new(descriptor: ChainDescriptor) -> Self {
        Self {
            descriptor,
            native_balance: Arc::new(Mutex::new(U256::from(10u64).pow(U256::from(18u64)))),
            min_gas_balance: U256::from(10_000_000u64),
            state: Arc::default(),
        }
    }

    pub fn set_native_balance(&self, balance: U256) {
        *self.native_balance.lock().unwrap() = balance;
    }

    pub fn script_approve(&self, outcomes: impl IntoIterator<Item = FakeOutcome>) {
        self.state.lock().unwrap().approve.extend(outcomes);
    }

    pub fn script_burn(&self, outcomes: impl IntoIterator<Item = FakeOutcome>) {
        self.state.lock().unwrap().burn.extend(outcomes);
    }

    pub fn script_mint(&self, outcomes: impl IntoIterator<Item = FakeOutcome>) {
        self.state.lock().unwrap().mint.extend(outcomes);
    }

    /// Operation names in call order (`approve`, `burn`, `mint`,
    /// `message_received`, `native_balance`)
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|call| **call == operation).count()
    }

    pub fn burn_requests(&self) -> Vec<BurnRequest> {
        self.state.lock().unwrap().burn_requests.clone()
    }

    /// `(message, attestation)` of every mint attempt
    pub fn minted(&self) -> Vec<(Bytes, Bytes)> {
        self.state.lock().unwrap().minted.clone()
    }

    fn tx_ref(&self, operation: &str, attempt: usize) -> TxRef {
        TxRef::new(format!("{}-{operation}-{attempt}", self.descriptor.chain_id))
    }

    fn owner_word(&self) -> FixedBytes<32> {
        match self.descriptor.family() {
            ChainFamily::Evm => evm_to_word(test_evm_signer().address()),
            ChainFamily::Solana => FixedBytes::from([42u8; 32]),
        }
    }
}

#[async_trait]
impl ChainAdapter for FakeChainAdapter {
    fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    fn owner(&self) -> String {
        self.owner_word().to_string()
    }

    fn derive_recipient(&self) -> Result<FixedBytes<32>> {
        Ok(self.owner_word())
    }

    fn caller_word(&self) -> FixedBytes<32> {
        self.owner_word()
    }

    async fn approve(&self, _amount: U256) -> Result<ApproveOutcome> {
        let (outcome, attempt) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push("approve");
            let attempt = state.calls.iter().filter(|c| **c == "approve").count();
            (state.approve.pop_front().unwrap_or(FakeOutcome::Success), attempt)
        };

        let tx = outcome.into_result("approve", self.tx_ref("approve", attempt))?;
        Ok(match self.descriptor.family() {
            ChainFamily::Evm => ApproveOutcome::Submitted(tx),
            ChainFamily::Solana => ApproveOutcome::NotRequired,
        })
    }

    async fn burn(&self, request: &BurnRequest) -> Result<TxRef> {
        let (outcome, attempt) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push("burn");
            state.burn_requests.push(request.clone());
            let attempt = state.burn_requests.len();
            (state.burn.pop_front().unwrap_or(FakeOutcome::Success), attempt)
        };
        outcome.into_result("burn", self.tx_ref("burn", attempt))
    }

    async fn mint(&self, message: &Bytes, attestation: &Bytes) -> Result<TxRef> {
        let (outcome, attempt) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push("mint");
            state.minted.push((message.clone(), attestation.clone()));
            if state.received {
                return Err(CctpError::ContractCall(
                    "mint: execution reverted: Nonce already used".into(),
                ));
            }
            let outcome = state.mint.pop_front().unwrap_or(FakeOutcome::Success);
            if matches!(
                outcome,
                FakeOutcome::Success | FakeOutcome::Unconfirmed { landed: true }
            ) {
                state.received = true;
            }
            (outcome, state.minted.len())
        };
        outcome.into_result("mint", self.tx_ref("mint", attempt))
    }

    async fn message_received(&self, _message: &Bytes) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("message_received");
        Ok(state.received)
    }

    async fn native_balance(&self) -> Result<U256> {
        self.state.lock().unwrap().calls.push("native_balance");
        Ok(*self.native_balance.lock().unwrap())
    }

    fn min_gas_balance(&self) -> U256 {
        self.min_gas_balance
    }
}

// ============================================================================
// Fake Solana RPC
// ============================================================================

/// In-memory Solana RPC: accounts and balances are set by the test, sent
/// transactions are recorded and confirmed immediately unless confirmations
/// are switched off with [`FakeSolanaRpc::lose_confirmations`].
#[derive(Clone, Debug, Default)]
pub struct FakeSolanaRpc {
    accounts: Arc<Mutex<HashMap<Pubkey, Vec<u8>>>>,
    balances: Arc<Mutex<HashMap<Pubkey, u64>>>,
    sent: Arc<Mutex<Vec<Transaction>>>,
    unconfirmed: Arc<Mutex<bool>>,
}

impl FakeSolanaRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(address, data);
    }

    pub fn set_balance(&self, address: Pubkey, lamports: u64) {
        self.balances.lock().unwrap().insert(address, lamports);
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent transactions are recorded but never confirmed.
    pub fn lose_confirmations(&self) {
        *self.unconfirmed.lock().unwrap() = true;
    }
}

#[async_trait]
impl SolanaRpc for FakeSolanaRpc {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .copied()
            .unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_from_array([1u8; 32]))
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.sent.lock().unwrap().push(transaction.clone());
        let signature = transaction.signatures.first().copied().unwrap_or_default();
        if *self.unconfirmed.lock().unwrap() {
            return Err(CctpError::TransactionUnconfirmed {
                tx: TxRef::from_solana(&signature),
                reason: "signature not found before the blockhash expired".into(),
            });
        }
        Ok(signature)
    }
}

// ============================================================================
// Fake Chain Clients
// ============================================================================

pub fn test_evm_signer() -> PrivateKeySigner {
    PrivateKeySigner::from_str(TEST_EVM_KEY).unwrap()
}

/// Chain clients backed by fakes.
///
/// Adapters exist only for chains registered with
/// [`with_adapter`](Self::with_adapter); other chains of the registry fail
/// with [`CctpError::UnknownChain`] when an adapter is requested.
#[derive(Clone)]
pub struct FakeChainClients {
    registry: ChainRegistry,
    adapters: HashMap<ChainId, Arc<FakeChainAdapter>>,
    solana_rpc: Arc<FakeSolanaRpc>,
    adapter_requests: Arc<Mutex<Vec<ChainId>>>,
}

impl FakeChainClients {
    pub fn new(registry: ChainRegistry) -> Self {
        Self {
            registry,
            adapters: HashMap::new(),
            solana_rpc: Arc::new(FakeSolanaRpc::new()),
            adapter_requests: Arc::default(),
        }
    }

    /// Fakes over the default testnet registry.
    pub fn testnet() -> Self {
        Self::new(ChainRegistry::testnet())
    }

    /// Registers a [`FakeChainAdapter`] for `chain_id` and returns a handle
    /// to it for scripting and inspection.
    pub fn with_adapter(&mut self, chain_id: ChainId) -> Arc<FakeChainAdapter> {
        let descriptor = self
            .registry
            .describe(chain_id)
            .unwrap()
            .clone();
        let adapter = Arc::new(FakeChainAdapter::new(descriptor));
        self.adapters.insert(chain_id, Arc::clone(&adapter));
        adapter
    }

    pub fn solana_rpc(&self) -> Arc<FakeSolanaRpc> {
        Arc::clone(&self.solana_rpc)
    }

    /// Chains an adapter was requested for, in order
    pub fn adapter_requests(&self) -> Vec<ChainId> {
        self.adapter_requests.lock().unwrap().clone()
    }
}

impl ChainClients for FakeChainClients {
    fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    fn identity_for(&self, chain_id: ChainId) -> Result<SigningIdentity> {
        Ok(match self.registry.resolve_family(chain_id)? {
            ChainFamily::Evm => SigningIdentity::Evm(test_evm_signer()),
            ChainFamily::Solana => {
                SigningIdentity::Solana(Arc::new(keypair_from_seed(&TEST_SOLANA_SEED).unwrap()))
            }
        })
    }

    fn read_client_for(&self, chain_id: ChainId) -> Result<ReadClient> {
        match self.registry.resolve_family(chain_id)? {
            ChainFamily::Solana => Ok(ReadClient::Solana(self.solana_rpc.clone())),
            ChainFamily::Evm => Err(CctpError::Provider(
                "FakeChainClients has no EVM read client".into(),
            )),
        }
    }

    fn adapter_for(&self, chain_id: ChainId) -> Result<Arc<dyn ChainAdapter>> {
        self.adapter_requests.lock().unwrap().push(chain_id);
        self.adapters
            .get(&chain_id)
            .map(|adapter| Arc::clone(adapter) as Arc<dyn ChainAdapter>)
            .ok_or(CctpError::UnknownChain(chain_id))
    }
}

// ============================================================================
// Fake Reward Hook
// ============================================================================

/// A reward hook for one chain that succeeds or fails as configured.
#[derive(Clone, Debug)]
pub struct FakeRewardHook {
    chain: ChainId,
    fail: bool,
    credits: Arc<Mutex<Vec<U256>>>,
}

impl FakeRewardHook {
    pub fn succeeding(chain: ChainId) -> Self {
        Self {
            chain,
            fail: false,
            credits: Arc::default(),
        }
    }

    pub fn failing(chain: ChainId) -> Self {
        Self {
            fail: true,
            ..Self::succeeding(chain)
        }
    }

    /// Amounts the hook was invoked with
    pub fn credits(&self) -> Vec<U256> {
        self.credits.lock().unwrap().clone()
    }
}

#[async_trait]
impl RewardHook for FakeRewardHook {
    fn applies_to(&self, destination: ChainId) -> bool {
        destination == self.chain
    }

    async fn mint_loyalty_credit(
        &self,
        _destination: &ChainDescriptor,
        _identity: &SigningIdentity,
        amount: U256,
    ) -> Result<TxRef> {
        self.credits.lock().unwrap().push(amount);
        if self.fail {
            return Err(CctpError::SecondaryHookFailed {
                reason: "offset purchase reverted".into(),
            });
        }
        Ok(TxRef::new("reward-1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(120)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(180));
        assert_eq!(clock.now() - start, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_fake_attestation_provider_replays_script() {
        let provider = FakeAttestationProvider::with_script(vec![
            FakeAttestation::NotFound,
            FakeAttestation::Pending,
        ]);
        let tx = TxRef::new("0x01");

        assert!(matches!(
            provider.get_messages(DomainId::Ethereum, &tx).await,
            Err(CctpError::AttestationPending)
        ));
        for _ in 0..3 {
            let response = provider.get_messages(DomainId::Ethereum, &tx).await.unwrap();
            assert_eq!(
                response.first_message().unwrap().status,
                AttestationStatus::Pending
            );
        }
        assert_eq!(provider.request_count(), 4);
    }

    #[tokio::test]
    async fn test_fake_adapter_scripted_outcomes() {
        let mut clients = FakeChainClients::testnet();
        let adapter = clients.with_adapter(ChainId::BASE_SEPOLIA);
        adapter.script_mint([FakeOutcome::Transient, FakeOutcome::Fatal]);

        let message = Bytes::from_static(b"m");
        let attestation = Bytes::from_static(b"a");
        assert!(adapter.mint(&message, &attestation).await.unwrap_err().is_transient());
        assert!(!adapter.mint(&message, &attestation).await.unwrap_err().is_transient());
        assert!(adapter.mint(&message, &attestation).await.is_ok());
        assert_eq!(adapter.call_count("mint"), 3);
    }

    #[tokio::test]
    async fn test_fake_adapter_tracks_landed_mints() {
        let mut clients = FakeChainClients::testnet();
        let adapter = clients.with_adapter(ChainId::BASE_SEPOLIA);
        adapter.script_mint([FakeOutcome::Unconfirmed { landed: true }]);

        let message = Bytes::from_static(b"m");
        let attestation = Bytes::from_static(b"a");
        assert!(!adapter.message_received(&message).await.unwrap());

        let err = adapter.mint(&message, &attestation).await.unwrap_err();
        assert_eq!(err.broadcast_tx(), Some(&TxRef::new("84532-mint-1")));
        assert!(adapter.message_received(&message).await.unwrap());
        assert!(matches!(
            adapter.mint(&message, &attestation).await,
            Err(CctpError::ContractCall(_))
        ));
    }

    #[test]
    fn test_fake_clients_reject_unregistered_adapters() {
        let clients = FakeChainClients::testnet();
        assert!(matches!(
            clients.adapter_for(ChainId::BASE_SEPOLIA),
            Err(CctpError::UnknownChain(ChainId::BASE_SEPOLIA))
        ));
        assert_eq!(clients.adapter_requests(), vec![ChainId::BASE_SEPOLIA]);
    }
}
