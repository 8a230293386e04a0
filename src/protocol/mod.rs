//! CCTP protocol types
//!
//! Domain identifiers, finality thresholds, the v2 message header, attestation
//! API responses, and the 32-byte account word codec shared by every chain
//! family.

mod attestation;
mod domain_id;
mod finality;
mod message;
pub mod recipient;

pub use attestation::{AttestationRecord, AttestationStatus, V2AttestationResponse, V2Message};
pub use domain_id::DomainId;
pub use finality::FinalityThreshold;
pub use message::MessageHeader;
