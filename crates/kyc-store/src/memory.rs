//! In-memory proof store for development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kyc_core::Timestamp;
use kyc_zkp::PresentedProof;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::key::ProofKey;
use crate::store::{ProofStore, StoredProof};

/// Cheaply cloneable; all clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryProofStore {
    entries: Arc<RwLock<BTreeMap<ProofKey, StoredProof>>>,
}

impl MemoryProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ProofStore for MemoryProofStore {
    async fn store_until(
        &self,
        key: &ProofKey,
        proof: PresentedProof,
        expires_at: Timestamp,
    ) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.clone(), StoredProof::until(proof, expires_at));
        Ok(())
    }

    async fn get(&self, key: &ProofKey) -> Result<Option<StoredProof>, StoreError> {
        let now = Timestamp::now();
        let mut entries = self.entries.write();
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            tracing::debug!(subject = %key.subject().short(), "evicted expired proof");
            return Ok(None);
        }
        Ok(entries.get(key).cloned())
    }

    async fn remove(&self, key: &ProofKey) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn list_valid(&self) -> Result<Vec<(ProofKey, StoredProof)>, StoreError> {
        self.sweep_expired().await?;
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        let now = Timestamp::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }
}
