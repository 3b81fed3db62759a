//! Engine errors.
//!
//! A proof that fails to verify is not an error; it is a
//! [`crate::VerificationOutcome`] with `verified: false`. These variants
//! cover requests that cannot be evaluated at all.

use kyc_core::CoreError;
use kyc_ledger::LedgerError;
use kyc_store::StoreError;
use kyc_zkp::VerifyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The holder identifier is empty after normalization.
    #[error("invalid holder identifier: {0}")]
    InvalidIdentifier(String),

    /// The proof category is not one of `age`, `country`, `captcha`.
    #[error("{0}")]
    UnsupportedProofType(String),

    /// The ledger could not be read, or has no state.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The verifier could not run.
    #[error(transparent)]
    Verifier(#[from] VerifyError),
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedProofType(_) => Self::UnsupportedProofType(err.to_string()),
            other => Self::InvalidIdentifier(other.to_string()),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        Self::LedgerUnavailable(err.to_string())
    }
}
