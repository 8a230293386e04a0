//! CCTP v2 message header
//!
//! The destination chain needs a few header fields before it can build the
//! receive call: the source domain and nonce select Solana's `used_nonce`
//! and `token_pair` accounts.
//!
//! Reference: <https://developers.circle.com/cctp/technical-guide>

use alloy_primitives::{Bytes, FixedBytes};

use super::DomainId;

/// CCTP v2 Message Header
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - sourceDomain: uint32 (4 bytes)
/// - destinationDomain: uint32 (4 bytes)
/// - nonce: bytes32 (32 bytes)
/// - sender: bytes32 (32 bytes)
/// - recipient: bytes32 (32 bytes)
/// - destinationCaller: bytes32 (32 bytes)
/// - minFinalityThreshold: uint32 (4 bytes)
/// - finalityThresholdExecuted: uint32 (4 bytes)
///
/// Total fixed size: 148 bytes, followed by the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: DomainId,
    pub destination_domain: DomainId,
    pub nonce: FixedBytes<32>,
    pub sender: FixedBytes<32>,
    pub recipient: FixedBytes<32>,
    /// Only this account may call receive on the destination (zero = anyone)
    pub destination_caller: FixedBytes<32>,
    pub min_finality_threshold: u32,
    pub finality_threshold_executed: u32,
}

impl MessageHeader {
    pub const SIZE: usize = 148;

    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::SIZE);

        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(self.nonce.as_slice());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.min_finality_threshold.to_be_bytes());
        bytes.extend_from_slice(&self.finality_threshold_executed.to_be_bytes());

        Bytes::from(bytes)
    }

    /// Decodes the header at the start of a message.
    ///
    /// Returns `None` if the bytes are shorter than [`MessageHeader::SIZE`] or
    /// carry an unknown domain.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }

        let word = |offset: usize| FixedBytes::<32>::from_slice(&bytes[offset..offset + 32]);

        Some(Self {
            version: read_u32(bytes, 0),
            source_domain: DomainId::from_u32(read_u32(bytes, 4))?,
            destination_domain: DomainId::from_u32(read_u32(bytes, 8))?,
            nonce: word(12),
            sender: word(44),
            recipient: word(76),
            destination_caller: word(108),
            min_finality_threshold: read_u32(bytes, 140),
            finality_threshold_executed: read_u32(bytes, 144),
        })
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> MessageHeader {
        MessageHeader {
            version: 1,
            source_domain: DomainId::Base,
            destination_domain: DomainId::Solana,
            nonce: FixedBytes::from([9u8; 32]),
            sender: FixedBytes::from([2u8; 32]),
            recipient: FixedBytes::from([3u8; 32]),
            destination_caller: FixedBytes::ZERO,
            min_finality_threshold: 1000,
            finality_threshold_executed: 1000,
        }
    }

    #[test]
    fn test_decode_reads_fields_at_fixed_offsets() {
        let mut message = header().encode().to_vec();
        message.extend_from_slice(&[0xaa; 64]);

        assert_eq!(&message[4..8], &6u32.to_be_bytes());
        assert_eq!(&message[12..44], &[9u8; 32]);

        let decoded = MessageHeader::decode(&message).unwrap();
        assert_eq!(decoded, header());
    }

    #[test]
    fn test_decode_too_short() {
        assert!(MessageHeader::decode(&[0u8; 100]).is_none());
    }

    #[test]
    fn test_decode_invalid_domain() {
        let mut bytes = vec![0u8; MessageHeader::SIZE];
        bytes[4..8].copy_from_slice(&999u32.to_be_bytes());
        assert!(MessageHeader::decode(&bytes).is_none());
    }
}
