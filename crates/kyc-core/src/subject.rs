//! # Subject Keys — Pseudonymous Ledger Index
//!
//! A [`SubjectKey`] is the only index into the commitment ledger and the
//! proof store. It is derived from the holder's wallet identifier by
//! normalizing (trim, lower-case) and hashing with SHA-256.
//!
//! ## Security Invariant
//!
//! The derivation is one-way. Ledger observers see subject keys, never
//! wallet identifiers, and cannot enumerate holders without already knowing
//! their identifiers. The raw identifier is never stored by this crate.

use serde::{Deserialize, Serialize};

use crate::digest::sha256_raw;
use crate::error::CoreError;

const PREFIX: &str = "0x";
const HEX_LEN: usize = 64;

/// `0x` + 64 lower-case hex characters: the SHA-256 of a normalized holder
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectKey(String);

/// Derive the subject key for a holder identifier.
///
/// Casing and surrounding whitespace do not change the result.
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] if the identifier is empty after
/// trimming.
pub fn derive_subject_key(identifier: &str) -> Result<SubjectKey, CoreError> {
    let normalized = identifier.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(CoreError::InvalidIdentifier(
            "identifier is empty after normalization".into(),
        ));
    }
    let digest = sha256_raw(normalized.as_bytes());
    Ok(SubjectKey(format!("{PREFIX}{}", hex::encode(digest))))
}

impl SubjectKey {
    /// Validate a subject key received in rendered form.
    ///
    /// Upper-case hex is accepted and normalized to lower-case.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let body = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| CoreError::InvalidSubjectKey("missing 0x prefix".into()))?;
        if body.len() != HEX_LEN || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidSubjectKey(format!(
                "expected {HEX_LEN} hex characters after 0x"
            )));
        }
        Ok(Self(format!("{PREFIX}{}", body.to_ascii_lowercase())))
    }

    /// The rendered key, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as the 32-byte value passed to ledger circuits.
    pub fn to_bytes32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // The constructor guarantees 64 valid hex characters.
        if hex::decode_to_slice(&self.0[PREFIX.len()..], &mut out).is_err() {
            out = [0u8; 32];
        }
        out
    }

    /// First sixteen characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SubjectKey> for String {
    fn from(key: SubjectKey) -> Self {
        key.0
    }
}

impl std::str::FromStr for SubjectKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
