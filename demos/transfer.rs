//! Cross-chain USDC transfer
//!
//! Moves USDC between any two supported testnets, printing the session log
//! while the transfer runs.
//!
//! Prerequisites:
//! - USDC on the source chain from Circle's faucet (https://faucet.circle.com/)
//! - Gas on both chains (at least 0.01 ETH / SOL on the destination)
//!
//! Environment variables (set these in .env file):
//! - EVM_PRIVATE_KEY: hex private key used on every EVM chain
//! - SOLANA_PRIVATE_KEY: base58 keypair used on Solana
//! - IRIS_API_URL: (optional) attestation service, defaults to the sandbox
//! - RPC_URL_<chain id>: (optional) RPC override, e.g. RPC_URL_84532
//! - CARBON_OFFSET_MANAGER: (optional) offset manager on Arc Testnet, empty to disable
//!
//! Run with: `cargo run --example transfer -- <source chain id> <destination chain id> <amount> [fast|standard]`
//! e.g. `cargo run --example transfer -- 84532 103 1.5 fast`

use std::sync::Arc;

use cctp_transfer::{
    BalanceOracle, CarbonOffsetHook, CctpError, ChainClients, ChainId, ClientFactory,
    IrisAttestationProvider, RewardHook, SessionHandle, Settings, SpeedMode, TokioClock,
    TransferIntent, TransferOrchestrator, TransferPhase,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn parse_chain(value: Option<String>, name: &str) -> Result<ChainId, CctpError> {
    value
        .ok_or_else(|| CctpError::InvalidIntent(format!("missing {name} chain id")))?
        .parse()
        .map_err(|e| CctpError::InvalidIntent(format!("invalid {name} chain id: {e}")))
}

#[tokio::main]
async fn main() -> Result<(), CctpError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let source = parse_chain(args.next(), "source")?;
    let destination = parse_chain(args.next(), "destination")?;
    let amount = args.next().unwrap_or_else(|| "1".to_string());
    let speed: SpeedMode = args.next().as_deref().unwrap_or("fast").parse()?;

    let settings = Settings::from_env()?;
    let attestation_provider = IrisAttestationProvider::new(settings.iris_api_url());
    let hook: Option<Arc<dyn RewardHook>> = settings
        .carbon_offset_manager()
        .map(|manager| Arc::new(CarbonOffsetHook::arc_testnet(manager)) as Arc<dyn RewardHook>);
    let clients = ClientFactory::new(settings);

    let registry = clients.registry();
    let source_chain = registry.describe(source)?;
    let destination_chain = registry.describe(destination)?;

    println!("CCTP v2 transfer: {source_chain} -> {destination_chain}");
    println!("===========================================================\n");

    let oracle = BalanceOracle::new(&clients);
    for chain in [source, destination] {
        match oracle.own_balance(chain).await {
            Ok(balance) => println!("   {chain}: {balance} USDC"),
            Err(e) => println!("   {chain}: balance unavailable ({e})"),
        }
    }
    println!();

    let intent = TransferIntent::new(source, destination, &amount, speed)?;

    let orchestrator = TransferOrchestrator::builder()
        .clients(clients)
        .attestation_provider(attestation_provider)
        .clock(TokioClock::new())
        .maybe_reward_hook(hook)
        .build();

    // Ctrl-C stops the transfer at the next phase boundary
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nCancelling after the current step...");
                cancel.cancel();
            }
        }
    });

    let (publisher, mut handle) = SessionHandle::channel(intent.clone());
    let watch_log = async {
        let mut printed = 0;
        loop {
            let session = handle.snapshot();
            for entry in &session.log()[printed..] {
                println!("{entry}");
            }
            printed = session.log().len();
            // the publisher is dropped after the reward hook has logged
            if !handle.changed().await {
                break;
            }
        }
    };

    let (session, ()) = tokio::join!(
        orchestrator.execute_transfer_with(intent, &cancel, publisher),
        watch_log,
    );

    println!();
    match session.phase() {
        TransferPhase::Completed => {
            println!("Transfer complete");
            if let Some(tx) = session.burn_tx() {
                println!("   Burn: {tx}");
            }
            if let Some(tx) = session.mint_tx() {
                println!("   Mint: {tx}");
            }
        }
        phase => {
            println!(
                "Transfer stopped in {phase}: {}",
                session.last_error().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}
