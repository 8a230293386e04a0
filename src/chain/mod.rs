//! Chain metadata: identifiers, families, and the static registry of supported
//! CCTP v2 chains.

pub mod addresses;
mod descriptor;
mod registry;

pub use descriptor::{BalanceSource, ChainContracts, ChainDescriptor, ChainFamily, ChainId};
pub use registry::ChainRegistry;
