//! # Proof Store Trait
//!
//! Holds presented proofs between submission and verification. Expiry is
//! lazy: an expired entry is treated as absent and evicted when touched, and
//! [`ProofStore::list_valid`] sweeps everything that has lapsed.
//!
//! ## Security Invariant
//!
//! The store never inspects the proof payload. Whether a proof proves
//! anything is the verifier's decision.

use async_trait::async_trait;
use chrono::Duration;
use kyc_core::Timestamp;
use kyc_zkp::PresentedProof;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::key::ProofKey;

/// Default lifetime of a stored proof.
pub const DEFAULT_TTL_DAYS: i64 = 365;

pub fn default_ttl() -> Duration {
    Duration::days(DEFAULT_TTL_DAYS)
}

/// A stored proof and its expiry. Every write records an expiry; an entry
/// without one (older store files) never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProof {
    pub proof: PresentedProof,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl StoredProof {
    pub fn until(proof: PresentedProof, expires_at: Timestamp) -> Self {
        Self {
            proof,
            expires_at: Some(expires_at),
        }
    }

    /// An entry expires at `expires_at`, not after it.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Storage for presented proofs.
#[async_trait]
pub trait ProofStore: Send + Sync {
    /// Store (or replace) the proof under `key` until `expires_at`.
    async fn store_until(
        &self,
        key: &ProofKey,
        proof: PresentedProof,
        expires_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Store (or replace) the proof under `key` for `ttl` from now.
    /// Returns the expiry that was recorded.
    async fn store(
        &self,
        key: &ProofKey,
        proof: PresentedProof,
        ttl: Duration,
    ) -> Result<Timestamp, StoreError> {
        let expires_at = Timestamp::now().plus(ttl);
        self.store_until(key, proof, expires_at).await?;
        Ok(expires_at)
    }

    /// The live proof under `key`. Expired entries are evicted and reported
    /// as absent.
    async fn get(&self, key: &ProofKey) -> Result<Option<StoredProof>, StoreError>;

    /// Remove the entry under `key`. Returns whether one existed.
    async fn remove(&self, key: &ProofKey) -> Result<bool, StoreError>;

    /// Every live entry, ordered by key. Expired entries are removed first.
    async fn list_valid(&self) -> Result<Vec<(ProofKey, StoredProof)>, StoreError>;

    /// Remove every expired entry. Returns how many were removed.
    async fn sweep_expired(&self) -> Result<usize, StoreError>;
}
