use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer};

/// Response of `GET /v2/messages/{sourceDomain}?transactionHash={tx}`
///
/// A single burn transaction can emit several messages; transfers created by
/// this crate emit exactly one, so only the first entry is consulted.
///
/// # Example Response
///
/// ```json
/// {
///   "messages": [
///     {
///       "status": "complete",
///       "message": "0x...",
///       "attestation": "0x..."
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct V2AttestationResponse {
    #[serde(default)]
    pub messages: Vec<V2Message>,
}

impl V2AttestationResponse {
    pub fn first_message(&self) -> Option<&V2Message> {
        self.messages.first()
    }
}

/// One message entry of a [`V2AttestationResponse`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Message {
    pub status: AttestationStatus,

    /// Message bytes exactly as emitted on the source chain
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,

    /// Attester signatures (null or `"PENDING"` until complete)
    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,
}

impl V2Message {
    /// Converts a message into a record the mint phase may consume.
    ///
    /// Returns `None` unless the status is complete and both payloads are
    /// present.
    pub fn to_record(&self) -> Option<AttestationRecord> {
        match (&self.status, &self.message, &self.attestation) {
            (AttestationStatus::Complete, Some(message), Some(attestation)) => {
                Some(AttestationRecord {
                    status: AttestationStatus::Complete,
                    message: message.clone(),
                    attestation: attestation.clone(),
                })
            }
            _ => None,
        }
    }
}

/// A certified burn: the message and the signatures authorizing its mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRecord {
    pub status: AttestationStatus,
    pub message: Bytes,
    pub attestation: Bytes,
}

/// Circle's Iris API sometimes returns the string `"PENDING"` instead of
/// `null` for fields that are not ready yet.
///
/// - hex string (with or without "0x") → `Some(Bytes)`
/// - "PENDING" in any case, empty string, null, or missing → `None`
/// - invalid hex → error
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_response() {
        let json = r#"{
            "messages": [
                {
                    "status": "complete",
                    "message": "0xdeadbeef",
                    "attestation": "0x1234abcd"
                }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        let record = response.first_message().unwrap().to_record().unwrap();

        assert_eq!(record.status, AttestationStatus::Complete);
        assert_eq!(record.message.to_vec(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(record.attestation.to_vec(), vec![0x12, 0x34, 0xab, 0xcd]);
    }

    #[test]
    fn test_pending_string_is_absent() {
        let json = r#"{
            "messages": [
                {
                    "status": "pending_confirmations",
                    "message": "0xdeadbeef",
                    "attestation": "PENDING"
                }
            ]
        }"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        let message = response.first_message().unwrap();

        assert_eq!(message.status, AttestationStatus::PendingConfirmations);
        assert!(message.message.is_some());
        assert!(message.attestation.is_none());
        assert!(message.to_record().is_none());
    }

    #[test]
    fn test_complete_without_attestation_is_not_a_record() {
        let json = r#"{"messages":[{"status":"complete","message":"0xaa","attestation":null}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();

        assert!(response.first_message().unwrap().to_record().is_none());
    }

    #[test]
    fn test_hex_without_prefix_and_missing_fields() {
        let json = r#"{"messages":[{"status":"complete","message":"aa","attestation":"bb"}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        assert!(response.first_message().unwrap().to_record().is_some());

        let json = r#"{"messages":[{"status":"pending"}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        let message = response.first_message().unwrap();
        assert!(message.message.is_none());
        assert!(message.attestation.is_none());
    }

    #[test]
    fn test_invalid_hex_fails() {
        let json = r#"{"messages":[{"status":"complete","attestation":"not_valid_hex"}]}"#;
        assert!(serde_json::from_str::<V2AttestationResponse>(json).is_err());
    }

    #[test]
    fn test_empty_and_missing_messages() {
        let response: V2AttestationResponse = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert!(response.first_message().is_none());

        let response: V2AttestationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.first_message().is_none());
    }

    #[test]
    fn test_failed_status() {
        let json = r#"{"messages":[{"status":"failed"}]}"#;
        let response: V2AttestationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.first_message().unwrap().status,
            AttestationStatus::Failed
        );
    }
}
