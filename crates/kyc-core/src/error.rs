//! # Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Identifier text is never echoed back in error messages: a holder
//! identifier is personal data and error strings end up in logs.

use thiserror::Error;

/// Top-level error type for `kyc-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The holder identifier was empty after trimming.
    #[error("invalid holder identifier: {0}")]
    InvalidIdentifier(String),

    /// A subject key did not have the `0x` + 64 hex character shape.
    #[error("invalid subject key: {0}")]
    InvalidSubjectKey(String),

    /// A commitment hash was empty or not printable.
    #[error("invalid commitment: {0}")]
    InvalidCommitment(String),

    /// A proof category name outside the supported set.
    #[error("Unknown proof type: {0}. Supported types: age, country, captcha")]
    UnsupportedProofType(String),

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
