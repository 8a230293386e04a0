//! EVM contract bindings
//!
//! Alloy-generated bindings for the contracts a transfer touches, each behind a
//! small instrumented wrapper that builds unsigned [`TransactionRequest`]s:
//!
//! - [`Erc20Contract`]: USDC approval and balance reads
//! - [`TokenMessengerV2Contract`]: `depositForBurn` on the source chain
//! - [`MessageTransmitterV2Contract`]: `receiveMessage` on the destination chain
//! - [`OffsetManagerContract`]: carbon offset purchase after a completed transfer
//!
//! [`TransactionRequest`]: alloy_rpc_types::TransactionRequest

mod erc20;
mod message_transmitter;
mod offset_manager;
mod token_messenger;

pub use erc20::Erc20Contract;
pub use message_transmitter::MessageTransmitterV2Contract;
pub use offset_manager::OffsetManagerContract;
pub use token_messenger::{DepositForBurnArgs, TokenMessengerV2Contract};
