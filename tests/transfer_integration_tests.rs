//! Integration tests for the transfer state machine using fake implementations
//!
//! Every collaborator (chain adapters, attestation service, clock, reward hook)
//! is a fake from `cctp_transfer::testing`, so these tests exercise the full
//! approve, burn, attest and mint flow without a network.

use alloy_primitives::{address, Address, Bytes, U256};
use async_trait::async_trait;
use cctp_transfer::recipient::{evm_to_word, word_to_evm};
use cctp_transfer::testing::{
    FakeAttestation, FakeAttestationProvider, FakeChainClients, FakeClock, FakeOutcome,
    FakeRewardHook,
};
use cctp_transfer::{
    BalanceOracle, ChainId, Clock, DomainId, LogKind, SessionHandle, SpeedMode, TransferIntent,
    TransferOrchestrator, TransferPhase,
};
use rstest::rstest;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

type FakeOrchestrator<C = FakeClock> =
    TransferOrchestrator<FakeChainClients, FakeAttestationProvider, C>;

const MESSAGE: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0xca, 0xfe];
const ATTESTATION: &[u8] = &[0xab; 65];

fn complete() -> FakeAttestation {
    FakeAttestation::Complete {
        message: Bytes::from_static(MESSAGE),
        attestation: Bytes::from_static(ATTESTATION),
    }
}

fn intent(source: ChainId, destination: ChainId, amount: &str) -> TransferIntent {
    TransferIntent::new(source, destination, amount, SpeedMode::Fast).unwrap()
}

/// Helper function to create an orchestrator with fake collaborators
fn create_orchestrator(
    clients: FakeChainClients,
    attestation_provider: FakeAttestationProvider,
    clock: FakeClock,
) -> FakeOrchestrator {
    TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(attestation_provider)
        .clock(clock)
        .build()
}

#[tokio::test]
async fn test_same_chain_rejected_before_any_network_call() {
    let mut clients = FakeChainClients::testnet();
    let adapter = clients.with_adapter(ChainId::BASE_SEPOLIA);
    let attestation = FakeAttestationProvider::with_script(vec![complete()]);
    let orchestrator = create_orchestrator(clients, attestation.clone(), FakeClock::new());

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::BASE_SEPOLIA, ChainId::BASE_SEPOLIA, "1"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert!(session.phases_visited().is_empty());
    assert!(session.last_error().unwrap().contains("Invalid transfer intent"));
    assert!(orchestrator.clients().adapter_requests().is_empty());
    assert!(adapter.calls().is_empty());
    assert_eq!(attestation.request_count(), 0);
}

#[rstest]
#[case::evm_to_solana(ChainId::ETHEREUM_SEPOLIA, ChainId::SOLANA_DEVNET)]
#[case::solana_to_evm(ChainId::SOLANA_DEVNET, ChainId::BASE_SEPOLIA)]
#[case::evm_to_evm(ChainId::ARBITRUM_SEPOLIA, ChainId::ARC_TESTNET)]
#[tokio::test]
async fn test_completed_session_visits_every_phase_in_order(
    #[case] source: ChainId,
    #[case] destination: ChainId,
) {
    let mut clients = FakeChainClients::testnet();
    let source_adapter = clients.with_adapter(source);
    let destination_adapter = clients.with_adapter(destination);
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let session = orchestrator
        .execute_transfer(intent(source, destination, "2.5"), &CancellationToken::new())
        .await;

    assert_eq!(session.phase(), TransferPhase::Completed, "{:?}", session.last_error());
    assert_eq!(
        session.phases_visited(),
        vec![
            TransferPhase::Approving,
            TransferPhase::Burning,
            TransferPhase::WaitingAttestation,
            TransferPhase::Minting,
            TransferPhase::Completed,
        ]
    );
    assert_eq!(source_adapter.calls(), vec!["approve", "burn"]);
    assert_eq!(destination_adapter.calls(), vec!["native_balance", "mint"]);
    assert!(session.burn_tx().is_some());
    assert!(session.mint_tx().is_some());
    assert!(session.last_error().is_none());

    let timestamps: Vec<_> = session.log().iter().map(|entry| entry.timestamp).collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn test_solana_source_logs_that_no_approval_is_needed() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::SOLANA_DEVNET);
    clients.with_adapter(ChainId::BASE_SEPOLIA);
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::SOLANA_DEVNET, ChainId::BASE_SEPOLIA, "1"),
            &CancellationToken::new(),
        )
        .await;

    assert!(session.is_completed());
    assert!(session.approval_tx().is_none());
    assert!(session
        .log()
        .iter()
        .any(|entry| entry.phase == TransferPhase::Approving
            && entry.message == "No explicit approval needed on Solana Devnet"));
}

#[tokio::test]
async fn test_attestation_not_found_twice_then_complete() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    let destination = clients.with_adapter(ChainId::AVALANCHE_FUJI);
    let attestation = FakeAttestationProvider::not_found_then_complete(
        2,
        Bytes::from_static(MESSAGE),
        Bytes::from_static(ATTESTATION),
    );
    let clock = FakeClock::new();
    let orchestrator = create_orchestrator(clients, attestation.clone(), clock.clone());

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::AVALANCHE_FUJI, "100"),
            &CancellationToken::new(),
        )
        .await;

    assert!(session.is_completed());
    assert_eq!(attestation.request_count(), 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);

    let burn_tx = session.burn_tx().unwrap().clone();
    assert!(attestation
        .requests()
        .iter()
        .all(|request| *request == (DomainId::Ethereum, burn_tx.clone())));

    let record = session.attestation().unwrap();
    assert_eq!(record.message.as_ref(), MESSAGE);
    assert_eq!(record.attestation.as_ref(), ATTESTATION);
    assert_eq!(
        destination.minted(),
        vec![(Bytes::from_static(MESSAGE), Bytes::from_static(ATTESTATION))]
    );

    let waiting: Vec<_> = session
        .entries_of(LogKind::Progress)
        .filter(|entry| entry.phase == TransferPhase::WaitingAttestation)
        .map(|entry| entry.message.as_str())
        .collect();
    insta::assert_debug_snapshot!(waiting, @r#"
    [
        "Attempt 1: burn not indexed yet, next check in 5s",
        "Attempt 2: burn not indexed yet, next check in 5s",
        "Attestation complete (6 byte message)",
    ]
    "#);
}

#[tokio::test]
async fn test_transient_mint_errors_retry_with_increasing_delay() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::SOLANA_DEVNET);
    let destination = clients.with_adapter(ChainId::BASE_SEPOLIA);
    destination.script_mint([FakeOutcome::Transient, FakeOutcome::Transient]);

    let clock = FakeClock::new();
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        clock.clone(),
    );

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::SOLANA_DEVNET, ChainId::BASE_SEPOLIA, "3"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Completed);
    assert_eq!(destination.call_count("mint"), 3);
    assert_eq!(session.entries_of(LogKind::Retry).count(), 2);

    let delays = clock.sleeps();
    assert_eq!(delays, vec![Duration::from_secs(2), Duration::from_secs(4)]);
    assert!(delays[0] < delays[1]);
    assert!(session
        .entries_of(LogKind::Retry)
        .all(|entry| entry.phase == TransferPhase::Minting));
}

#[tokio::test]
async fn test_insufficient_gas_stops_before_mint() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    let destination = clients.with_adapter(ChainId::SOLANA_DEVNET);
    destination.set_native_balance(U256::from(1_000u64));

    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::SOLANA_DEVNET, "5"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert_eq!(destination.calls(), vec!["native_balance"]);
    assert!(destination.minted().is_empty());
    assert_eq!(
        session.phases_visited().last(),
        Some(&TransferPhase::Minting)
    );
    insta::assert_snapshot!(
        session.last_error().unwrap(),
        @"Insufficient gas balance on Solana Devnet (103): have 0.000001, need at least 0.01"
    );
}

#[tokio::test]
async fn test_reward_hook_failure_keeps_transfer_completed() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::BASE_SEPOLIA);
    clients.with_adapter(ChainId::ARC_TESTNET);
    let hook = Arc::new(FakeRewardHook::failing(ChainId::ARC_TESTNET));

    let orchestrator = TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(FakeAttestationProvider::with_script(vec![complete()]))
        .clock(FakeClock::new())
        .reward_hook(hook.clone())
        .build();

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::BASE_SEPOLIA, ChainId::ARC_TESTNET, "4"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Completed);
    assert!(session.last_error().is_none());
    assert_eq!(hook.credits(), vec![U256::from(4_000_000u64)]);

    let warnings: Vec<_> = session.entries_of(LogKind::Warning).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].phase, TransferPhase::Completed);
    insta::assert_snapshot!(
        warnings[0].message,
        @"Reward hook failed: offset purchase reverted"
    );
}

#[tokio::test]
async fn test_reward_hook_runs_only_on_rewards_chain() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::BASE_SEPOLIA);
    clients.with_adapter(ChainId::ARC_TESTNET);
    clients.with_adapter(ChainId::SOLANA_DEVNET);
    let hook = Arc::new(FakeRewardHook::succeeding(ChainId::ARC_TESTNET));

    let orchestrator = TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(FakeAttestationProvider::with_script(vec![complete()]))
        .clock(FakeClock::new())
        .reward_hook(hook.clone())
        .build();

    let to_solana = orchestrator
        .execute_transfer(
            intent(ChainId::BASE_SEPOLIA, ChainId::SOLANA_DEVNET, "1"),
            &CancellationToken::new(),
        )
        .await;
    assert!(to_solana.is_completed());
    assert!(to_solana.reward_tx().is_none());
    assert!(hook.credits().is_empty());

    let to_arc = orchestrator
        .execute_transfer(
            intent(ChainId::BASE_SEPOLIA, ChainId::ARC_TESTNET, "1"),
            &CancellationToken::new(),
        )
        .await;
    assert!(to_arc.is_completed());
    assert!(to_arc.reward_tx().is_some());
    assert_eq!(hook.credits(), vec![U256::from(1_000_000u64)]);
}

#[tokio::test]
async fn test_burn_failure_is_fatal() {
    let mut clients = FakeChainClients::testnet();
    let source = clients.with_adapter(ChainId::POLYGON_AMOY);
    let destination = clients.with_adapter(ChainId::LINEA_SEPOLIA);
    source.script_burn([FakeOutcome::Transient]);
    let attestation = FakeAttestationProvider::with_script(vec![complete()]);

    let orchestrator = create_orchestrator(clients, attestation.clone(), FakeClock::new());
    let session = orchestrator
        .execute_transfer(
            intent(ChainId::POLYGON_AMOY, ChainId::LINEA_SEPOLIA, "1"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert!(session.burn_tx().is_none());
    assert_eq!(source.call_count("burn"), 1);
    assert!(destination.calls().is_empty());
    assert_eq!(attestation.request_count(), 0);
    assert!(session.last_error().unwrap().starts_with("Burn failed:"));
    assert_eq!(
        session.log().last().map(|entry| entry.kind),
        Some(LogKind::Failure)
    );
}

#[rstest]
#[case::failed(FakeAttestation::Failed, "Attestation failed")]
#[case::server_error(FakeAttestation::Transport(500), "Attestation service error (HTTP 500)")]
#[case::rate_limited(FakeAttestation::Transport(429), "Attestation service error (HTTP 429)")]
#[tokio::test]
async fn test_attestation_errors_are_fatal(
    #[case] answer: FakeAttestation,
    #[case] expected_prefix: &str,
) {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    let destination = clients.with_adapter(ChainId::BASE_SEPOLIA);
    let attestation = FakeAttestationProvider::with_script(vec![answer]);
    let clock = FakeClock::new();

    let orchestrator = create_orchestrator(clients, attestation.clone(), clock.clone());
    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::BASE_SEPOLIA, "1"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert!(session.last_error().unwrap().starts_with(expected_prefix));
    assert_eq!(attestation.request_count(), 1);
    assert_eq!(clock.sleep_count(), 0);
    assert!(destination.calls().is_empty());
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let mut clients = FakeChainClients::testnet();
    let source = clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    clients.with_adapter(ChainId::BASE_SEPOLIA);
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::BASE_SEPOLIA, "1"),
            &cancel,
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert_eq!(session.last_error(), Some("Transfer cancelled"));
    assert!(source.calls().is_empty());
}

/// Clock that fires a cancellation token on its first sleep.
#[derive(Clone)]
struct CancellingClock {
    inner: FakeClock,
    cancel: CancellationToken,
}

#[async_trait]
impl Clock for CancellingClock {
    async fn sleep(&self, duration: Duration) {
        self.cancel.cancel();
        self.inner.sleep(duration).await;
    }

    fn now(&self) -> Instant {
        self.inner.now()
    }
}

#[tokio::test]
async fn test_cancelled_while_waiting_for_attestation() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    let destination = clients.with_adapter(ChainId::BASE_SEPOLIA);
    let attestation = FakeAttestationProvider::with_script(vec![FakeAttestation::Pending]);
    let cancel = CancellationToken::new();

    let orchestrator: FakeOrchestrator<CancellingClock> = TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(attestation.clone())
        .clock(CancellingClock {
            inner: FakeClock::new(),
            cancel: cancel.clone(),
        })
        .build();

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::BASE_SEPOLIA, "1"),
            &cancel,
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Error);
    assert_eq!(session.last_error(), Some("Transfer cancelled"));
    assert_eq!(
        session.phases_visited().last(),
        Some(&TransferPhase::WaitingAttestation)
    );
    assert!(session.burn_tx().is_some());
    assert_eq!(attestation.request_count(), 1);
    assert!(destination.calls().is_empty());
}

#[tokio::test]
async fn test_session_handle_publishes_progress() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    clients.with_adapter(ChainId::SOLANA_DEVNET);
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let transfer = intent(ChainId::ETHEREUM_SEPOLIA, ChainId::SOLANA_DEVNET, "1");
    let (publisher, mut handle) = SessionHandle::channel(transfer.clone());
    assert_eq!(handle.phase(), TransferPhase::Idle);

    let cancel = CancellationToken::new();
    let (session, observed) = tokio::join!(
        orchestrator.execute_transfer_with(transfer, &cancel, publisher),
        handle.wait_until_finished(),
    );

    assert!(session.is_completed());
    assert_eq!(observed.phase(), TransferPhase::Completed);
    assert_eq!(observed.log(), session.log());
}

#[tokio::test]
async fn test_session_handle_sees_reward_hook_entries() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::BASE_SEPOLIA);
    clients.with_adapter(ChainId::ARC_TESTNET);
    let hook = Arc::new(FakeRewardHook::succeeding(ChainId::ARC_TESTNET));
    let orchestrator = TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(FakeAttestationProvider::with_script(vec![complete()]))
        .clock(FakeClock::new())
        .reward_hook(hook)
        .build();

    let transfer = intent(ChainId::BASE_SEPOLIA, ChainId::ARC_TESTNET, "2");
    let (publisher, mut handle) = SessionHandle::channel(transfer.clone());
    let cancel = CancellationToken::new();
    let (session, observed) = tokio::join!(
        orchestrator.execute_transfer_with(transfer, &cancel, publisher),
        handle.wait_until_finished(),
    );

    assert!(session.reward_tx().is_some());
    assert_eq!(observed.reward_tx(), session.reward_tx());
    assert_eq!(observed.log(), session.log());
    assert!(observed
        .log()
        .last()
        .unwrap()
        .message
        .starts_with("Carbon offset credit minted"));
}

#[tokio::test]
async fn test_mint_that_landed_without_receipt_is_not_resubmitted() {
    let mut clients = FakeChainClients::testnet();
    clients.with_adapter(ChainId::ETHEREUM_SEPOLIA);
    let destination = clients.with_adapter(ChainId::BASE_SEPOLIA);
    destination.script_mint([FakeOutcome::Unconfirmed { landed: true }]);
    let orchestrator = create_orchestrator(
        clients,
        FakeAttestationProvider::with_script(vec![complete()]),
        FakeClock::new(),
    );

    let session = orchestrator
        .execute_transfer(
            intent(ChainId::ETHEREUM_SEPOLIA, ChainId::BASE_SEPOLIA, "3"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(session.phase(), TransferPhase::Completed);
    assert_eq!(session.mint_tx().unwrap().as_str(), "84532-mint-1");
    assert_eq!(
        destination.calls(),
        vec!["native_balance", "mint", "message_received"]
    );
}

#[tokio::test]
async fn test_balance_of_solana_owner_without_token_account() {
    let clients = FakeChainClients::testnet();
    let oracle = BalanceOracle::new(&clients);
    let owner = Pubkey::new_unique().to_string();

    assert_eq!(
        oracle.balance_of(ChainId::SOLANA_DEVNET, &owner).await.unwrap(),
        "0"
    );
}

#[rstest]
#[case(Address::ZERO)]
#[case(address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"))]
#[case(address!("ffffffffffffffffffffffffffffffffffffffff"))]
fn test_evm_recipient_word_round_trip(#[case] original: Address) {
    let word = evm_to_word(original);
    assert!(word[..12].iter().all(|byte| *byte == 0));
    assert_eq!(word_to_evm(word).unwrap(), original);
}
