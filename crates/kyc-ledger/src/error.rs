//! Ledger access error types.

use crate::config::ConfigError;

/// Errors from reading or mutating the commitment ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// HTTP transport error talking to the ledger gateway.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The gateway returned a non-2xx status.
    #[error("ledger gateway {endpoint} returned {status}: {body}")]
    Gateway {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The ledger could not be read for a reason other than transport.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The mutation was accepted but did not finalize successfully.
    #[error("transaction {transaction_id} for {circuit} finalized with status {status}")]
    TransactionFailed {
        circuit: String,
        transaction_id: String,
        status: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
