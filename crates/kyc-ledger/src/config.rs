//! Ledger gateway client configuration.
//!
//! The gateway is an indexer/relayer that exposes contract state over HTTP
//! and submits circuit calls on the service's behalf.

use url::Url;

/// Configuration for [`crate::http::HttpLedgerClient`].
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct LedgerClientConfig {
    /// Gateway base URL.
    pub base_url: Url,
    /// Address of the credential contract.
    pub contract_address: String,
    /// Optional bearer token for the gateway.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LedgerClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerClientConfig")
            .field("base_url", &self.base_url)
            .field("contract_address", &self.contract_address)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LedgerClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `KYC_LEDGER_URL` (required)
    /// - `KYC_LEDGER_CONTRACT` (required)
    /// - `KYC_LEDGER_TOKEN` (optional)
    /// - `KYC_LEDGER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            std::env::var("KYC_LEDGER_URL").map_err(|_| ConfigError::Missing("KYC_LEDGER_URL"))?;
        let contract_address = std::env::var("KYC_LEDGER_CONTRACT")
            .map_err(|_| ConfigError::Missing("KYC_LEDGER_CONTRACT"))?;
        Self::new(
            &raw_url,
            &contract_address,
            std::env::var("KYC_LEDGER_TOKEN").ok().filter(|t| !t.is_empty()),
            std::env::var("KYC_LEDGER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        )
    }

    /// Build and validate a configuration.
    pub fn new(
        base_url: &str,
        contract_address: &str,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl("KYC_LEDGER_URL".to_string(), e.to_string()))?;
        let contract_address = contract_address.trim();
        if contract_address.is_empty() {
            return Err(ConfigError::Missing("KYC_LEDGER_CONTRACT"));
        }
        Ok(Self {
            base_url,
            contract_address: contract_address.to_string(),
            api_token,
            timeout_secs,
        })
    }

    /// `{base}/contracts/{address}` without a trailing slash.
    pub(crate) fn contract_url(&self) -> String {
        format!(
            "{}/contracts/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.contract_address
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("KYC_LEDGER_TOKEN contains characters not allowed in an HTTP header")]
    InvalidToken,
}
