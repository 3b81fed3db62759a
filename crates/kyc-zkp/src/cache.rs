//! # Verifying-Key Cache
//!
//! Verifying keys are loaded once per category on first use and shared for
//! the lifetime of the cache. The cache is an explicit value handed to the
//! verifiers that need it; there is no process-global state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kyc_core::ProofCategory;
use parking_lot::RwLock;

use crate::traits::VerifyError;

/// Populate-on-first-use cache of verifying keys, keyed by proof category.
#[derive(Debug)]
pub struct VerifyingKeyCache<K> {
    keys: RwLock<HashMap<ProofCategory, Arc<K>>>,
    loads: AtomicUsize,
}

impl<K> Default for VerifyingKeyCache<K> {
    fn default() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }
}

impl<K> VerifyingKeyCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key, running `load` if this category has none yet.
    ///
    /// A failed load leaves the slot empty so the next call retries.
    pub fn get_or_load<F>(&self, category: ProofCategory, load: F) -> Result<Arc<K>, VerifyError>
    where
        F: FnOnce() -> Result<K, VerifyError>,
    {
        if let Some(key) = self.keys.read().get(&category) {
            return Ok(key.clone());
        }

        let mut keys = self.keys.write();
        if let Some(key) = keys.get(&category) {
            return Ok(key.clone());
        }
        let key = Arc::new(load()?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(category = %category, "verifying key loaded");
        keys.insert(category, key.clone());
        Ok(key)
    }

    /// Number of successful loads so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Drop every cached key.
    pub fn clear(&self) {
        self.keys.write().clear();
    }
}
