//! # Commitment Hashes
//!
//! A commitment is the on-ledger binding of a holder's private attribute.
//! The engine treats commitments as opaque strings and compares them byte
//! for byte; it never needs to know how they were produced.
//!
//! Issuers that build commitments from structured credential data use
//! [`generate_credential_hash`], which hashes the JCS (RFC 8785) canonical
//! form so that field order in the source data does not matter. Digests are
//! not interchangeable with hashes of any other serialization.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::sha256_digest;
use crate::error::CoreError;

/// An opaque commitment hash as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitmentHash(String);

impl CommitmentHash {
    /// Wrap a commitment string. Surrounding whitespace is not significant.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidCommitment("commitment is empty".into()));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CoreError::InvalidCommitment(
                "commitment contains control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The commitment text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte-for-byte comparison against a raw ledger value.
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CommitmentHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommitmentHash> for String {
    fn from(c: CommitmentHash) -> Self {
        c.0
    }
}

/// Hash structured credential data into a `0x`-prefixed commitment.
///
/// # Errors
///
/// Returns [`CoreError::Canonicalization`] if the data contains floats or
/// cannot be serialized.
pub fn generate_credential_hash(data: &impl Serialize) -> Result<CommitmentHash, CoreError> {
    let canonical = CanonicalBytes::new(data)?;
    Ok(CommitmentHash(sha256_digest(&canonical).to_prefixed_hex()))
}
