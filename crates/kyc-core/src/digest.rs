//! # Content Digest
//!
//! SHA-256 digests over canonical bytes, used for credential hashes.
//!
//! ## Security Invariant
//!
//! `sha256_digest()` accepts only `&CanonicalBytes`, so no credential hash
//! can be computed over a non-canonical serialization. Subject key
//! derivation hashes normalized identifier text directly and lives in
//! [`crate::subject`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// A raw 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Render with the `0x` prefix used on the ledger.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// Access the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest(sha256_raw(data.as_bytes()))
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

pub(crate) fn sha256_raw(bytes: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_object_is_stable() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        // sha256("{}")
        assert_eq!(
            sha256_hex(&cb),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn prefixed_hex_has_0x() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let d = sha256_digest(&cb);
        assert!(d.to_prefixed_hex().starts_with("0x"));
        assert_eq!(d.to_prefixed_hex().len(), 66);
        assert!(d.to_string().starts_with("sha256:"));
    }
}
