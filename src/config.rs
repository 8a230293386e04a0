//! Runtime configuration
//!
//! [`Settings`] is read once from the environment (and a `.env` file when
//! present) and is immutable afterwards. Retry behavior lives in two small
//! policy structs, [`AttestationPolicy`] and [`MintRetryPolicy`], so callers
//! and tests can tune them without touching the environment.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::chain::addresses::ARC_OFFSET_MANAGER;
use crate::chain::ChainId;
use crate::error::{CctpError, Result};

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/cctp/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// CCTP v2 messages API path: `/v2/messages/{sourceDomain}?transactionHash={txHash}`
pub const MESSAGES_PATH_V2: &str = "/v2/messages/";

pub const EVM_PRIVATE_KEY_VAR: &str = "EVM_PRIVATE_KEY";
/// Accepted when [`EVM_PRIVATE_KEY_VAR`] is unset.
pub const EVM_PRIVATE_KEY_FALLBACK_VAR: &str = "PRIVATE_KEY";
pub const SOLANA_PRIVATE_KEY_VAR: &str = "SOLANA_PRIVATE_KEY";
pub const IRIS_API_URL_VAR: &str = "IRIS_API_URL";
pub const CARBON_OFFSET_MANAGER_VAR: &str = "CARBON_OFFSET_MANAGER";
/// Prefix of per-chain RPC overrides, e.g. `RPC_URL_84532`.
pub const RPC_URL_PREFIX: &str = "RPC_URL_";

/// Environment-derived settings.
///
/// Secrets are kept as the raw configured strings; decoding them into keys is
/// the job of [`ClientFactory`](crate::ClientFactory), which reports
/// malformed values with a descriptive error. `Debug` never prints them.
#[derive(Clone)]
pub struct Settings {
    evm_private_key: Option<String>,
    solana_private_key: Option<String>,
    iris_api_url: String,
    rpc_overrides: HashMap<ChainId, String>,
    carbon_offset_manager: Option<Address>,
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, event = "dotenv_not_loaded");
        }
        Self::from_vars(std::env::vars())
    }

    /// Builds settings from an explicit set of key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut evm_primary = None;
        let mut evm_fallback = None;
        let mut solana_private_key = None;
        let mut iris_api_url = None;
        let mut rpc_overrides = HashMap::new();
        let mut carbon_offset_manager = Some(ARC_OFFSET_MANAGER);

        for (key, value) in vars {
            let key = key.as_ref();
            let value: String = value.into();
            match key {
                EVM_PRIVATE_KEY_VAR => evm_primary = non_empty(value),
                EVM_PRIVATE_KEY_FALLBACK_VAR => evm_fallback = non_empty(value),
                SOLANA_PRIVATE_KEY_VAR => solana_private_key = non_empty(value),
                IRIS_API_URL_VAR => iris_api_url = non_empty(value),
                CARBON_OFFSET_MANAGER_VAR => {
                    carbon_offset_manager = match non_empty(value) {
                        None => None,
                        Some(raw) => Some(raw.parse().map_err(|e| {
                            CctpError::InvalidConfig(format!(
                                "{CARBON_OFFSET_MANAGER_VAR} is not an address: {e}"
                            ))
                        })?),
                    }
                }
                _ => {
                    if let Some(suffix) = key.strip_prefix(RPC_URL_PREFIX) {
                        match suffix.parse::<ChainId>() {
                            Ok(chain_id) => {
                                if let Some(url) = non_empty(value) {
                                    rpc_overrides.insert(chain_id, url);
                                }
                            }
                            Err(_) => warn!(
                                variable = key,
                                event = "rpc_override_ignored"
                            ),
                        }
                    }
                }
            }
        }

        let iris_api_url = iris_api_url.unwrap_or_else(|| IRIS_API_SANDBOX.to_string());
        url::Url::parse(&iris_api_url).map_err(|e| {
            CctpError::InvalidConfig(format!("{IRIS_API_URL_VAR} is not a URL: {e}"))
        })?;

        Ok(Self {
            evm_private_key: evm_primary.or(evm_fallback),
            solana_private_key,
            iris_api_url: iris_api_url.trim_end_matches('/').to_string(),
            rpc_overrides,
            carbon_offset_manager,
        })
    }

    pub fn evm_private_key(&self) -> Option<&str> {
        self.evm_private_key.as_deref()
    }

    pub fn solana_private_key(&self) -> Option<&str> {
        self.solana_private_key.as_deref()
    }

    pub fn iris_api_url(&self) -> &str {
        &self.iris_api_url
    }

    pub fn rpc_overrides(&self) -> &HashMap<ChainId, String> {
        &self.rpc_overrides
    }

    /// Offset manager used by the reward hook; `None` disables the hook.
    pub fn carbon_offset_manager(&self) -> Option<Address> {
        self.carbon_offset_manager
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("evm_private_key", &redact(&self.evm_private_key))
            .field("solana_private_key", &redact(&self.solana_private_key))
            .field("iris_api_url", &self.iris_api_url)
            .field("rpc_overrides", &self.rpc_overrides)
            .field("carbon_offset_manager", &self.carbon_offset_manager)
            .finish()
    }
}

/// What the poller does with an error from the attestation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Not ready yet; wait one interval and ask again.
    Retry,
    /// Stop polling and surface the error.
    Abort,
}

/// Default classification: only "not yet indexed" is retried.
///
/// Every other transport or HTTP failure aborts, so a systemic outage is not
/// mistaken for normal attestation latency.
pub fn classify_attestation_error(error: &CctpError) -> PollDecision {
    match error {
        CctpError::AttestationPending => PollDecision::Retry,
        _ => PollDecision::Abort,
    }
}

/// Attestation polling policy.
///
/// # Examples
///
/// ```rust
/// use cctp_transfer::AttestationPolicy;
/// use std::time::Duration;
///
/// // 5 second interval, no overall deadline
/// let policy = AttestationPolicy::default();
/// assert_eq!(policy.poll_interval, Duration::from_secs(5));
/// assert!(policy.max_wait.is_none());
///
/// let policy = AttestationPolicy::default()
///     .with_poll_interval(Duration::from_secs(2))
///     .with_max_wait(Duration::from_secs(1800));
/// assert_eq!(policy.max_wait, Some(Duration::from_secs(1800)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AttestationPolicy {
    /// Delay between unsuccessful checks.
    pub poll_interval: Duration,
    /// Overall deadline; `None` waits until the service answers.
    pub max_wait: Option<Duration>,
    pub classify: fn(&CctpError) -> PollDecision,
}

impl Default for AttestationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: None,
            classify: classify_attestation_error,
        }
    }
}

impl AttestationPolicy {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_classifier(mut self, classify: fn(&CctpError) -> PollDecision) -> Self {
        self.classify = classify;
        self
    }
}

/// Retry policy for the mint transaction.
///
/// Only transient execution failures are retried; the n-th retry waits
/// `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintRetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for MintRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl MintRetryPolicy {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_defaults_without_variables() {
        let settings = Settings::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert!(settings.evm_private_key().is_none());
        assert!(settings.solana_private_key().is_none());
        assert_eq!(settings.iris_api_url(), IRIS_API_SANDBOX);
        assert!(settings.rpc_overrides().is_empty());
        assert_eq!(settings.carbon_offset_manager(), Some(ARC_OFFSET_MANAGER));
    }

    #[test]
    fn test_reads_recognized_keys() {
        let settings = Settings::from_vars([
            ("PRIVATE_KEY", "0xfallback"),
            ("EVM_PRIVATE_KEY", "0xprimary"),
            ("SOLANA_PRIVATE_KEY", "  seed  "),
            ("IRIS_API_URL", "https://iris-api.circle.com/"),
            ("RPC_URL_84532", "http://localhost:8545"),
            ("RPC_URL_base", "http://ignored"),
            ("CARBON_OFFSET_MANAGER", "0x0000000000000000000000000000000000000001"),
            ("UNRELATED", "x"),
        ])
        .unwrap();

        assert_eq!(settings.evm_private_key(), Some("0xprimary"));
        assert_eq!(settings.solana_private_key(), Some("seed"));
        assert_eq!(settings.iris_api_url(), IRIS_API);
        assert_eq!(
            settings.rpc_overrides().get(&ChainId::BASE_SEPOLIA).map(String::as_str),
            Some("http://localhost:8545")
        );
        assert_eq!(settings.rpc_overrides().len(), 1);
        assert_eq!(
            settings.carbon_offset_manager(),
            Some(address!("0000000000000000000000000000000000000001"))
        );
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let settings = Settings::from_vars([("EVM_PRIVATE_KEY", "   ")]).unwrap();
        assert!(settings.evm_private_key().is_none());
    }

    #[test]
    fn test_empty_offset_manager_disables_hook() {
        let settings = Settings::from_vars([("CARBON_OFFSET_MANAGER", "")]).unwrap();
        assert!(settings.carbon_offset_manager().is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Settings::from_vars([("IRIS_API_URL", "not a url")]),
            Err(CctpError::InvalidConfig(_))
        ));
        assert!(matches!(
            Settings::from_vars([("CARBON_OFFSET_MANAGER", "0x1234")]),
            Err(CctpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = Settings::from_vars([
            ("EVM_PRIVATE_KEY", "0xsupersecret"),
            ("SOLANA_PRIVATE_KEY", "alsosecret"),
        ])
        .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("supersecret"));
        assert!(!rendered.contains("alsosecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_attestation_classifier() {
        assert_eq!(
            classify_attestation_error(&CctpError::AttestationPending),
            PollDecision::Retry
        );
        assert_eq!(
            classify_attestation_error(&CctpError::AttestationTransport {
                status: 500,
                reason: "boom".into()
            }),
            PollDecision::Abort
        );
    }

    #[test]
    fn test_mint_retry_delays_increase_linearly() {
        let policy = MintRetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(6));
    }
}
