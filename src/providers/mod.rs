//! Production implementations of the trait seams in [`crate::traits`].
//!
//! Applications use these; tests use the fakes in [`crate::testing`].

mod iris;
mod solana_rpc;
mod tokio_clock;

pub use self::iris::IrisAttestationProvider;
pub use self::solana_rpc::SolanaRpcClient;
pub use self::tokio_clock::TokioClock;
