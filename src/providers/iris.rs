//! Circle Iris API attestation provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, trace};

use crate::adapter::TxRef;
use crate::config::{IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V2};
use crate::error::{CctpError, Result};
use crate::protocol::{DomainId, V2AttestationResponse};
use crate::traits::AttestationProvider;

/// Production attestation provider using Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use cctp_transfer::providers::IrisAttestationProvider;
/// use cctp_transfer::{AttestationProvider, DomainId, TxRef};
///
/// # async fn example() -> Result<(), cctp_transfer::CctpError> {
/// let provider = IrisAttestationProvider::sandbox();
/// let tx = TxRef::new("0x912f22a13e9ccb979b621500f6952b2afd6e75be7eadaed93fc2625fe11c52a2");
/// let response = provider.get_messages(DomainId::Ethereum, &tx).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a new Iris attestation provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the Iris API (e.g., <https://iris-api.circle.com>)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn production() -> Self {
        Self::new(IRIS_API)
    }

    /// Circle's sandbox, which attests testnet burns.
    pub fn sandbox() -> Self {
        Self::new(IRIS_API_SANDBOX)
    }

    fn messages_url(&self, source_domain: DomainId, tx: &TxRef) -> String {
        format!(
            "{}{}{}?transactionHash={}",
            self.base_url,
            MESSAGES_PATH_V2,
            source_domain.as_u32(),
            tx
        )
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(source_domain = %source_domain, tx = %tx))]
    async fn get_messages(
        &self,
        source_domain: DomainId,
        tx: &TxRef,
    ) -> Result<V2AttestationResponse> {
        let url = self.messages_url(source_domain, tx);
        trace!(url = %url, "Requesting messages from Iris API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(CctpError::Network)?;

        let status_code = response.status();
        trace!(status_code = %status_code, "Received response from Iris API");

        // 404 until the burn is indexed
        if status_code == reqwest::StatusCode::NOT_FOUND {
            debug!("Messages not found yet");
            return Err(CctpError::AttestationPending);
        }

        if !status_code.is_success() {
            let reason = status_code
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string();
            debug!(status_code = status_code.as_u16(), reason = %reason, "Iris API error");
            return Err(CctpError::AttestationTransport {
                status: status_code.as_u16(),
                reason,
            });
        }

        let json_value = response
            .json::<serde_json::Value>()
            .await
            .map_err(CctpError::Network)?;

        let messages: V2AttestationResponse = serde_json::from_value(json_value)?;
        debug!(
            message_count = messages.messages.len(),
            status = ?messages.first_message().map(|m| m.status),
            "Messages response parsed"
        );

        Ok(messages)
    }
}
