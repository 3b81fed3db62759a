//! # In-Memory Ledger
//!
//! A process-local stand-in for the credential contract, used by the API's
//! development mode and by tests. Mutations overwrite fields exactly as the
//! contract does: each circuit replaces its three fields with the submitted
//! serialized maps, so lost-update behavior is reproduced faithfully.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::circuit::{LedgerMutation, MutationReceipt, SUCCESS_STATUS};
use crate::codec::{serialize_map, LedgerMap};
use crate::error::LedgerError;
use crate::fields::{LedgerField, RawLedgerFields};
use crate::source::{LedgerMutator, LedgerReader};

#[derive(Debug, Default)]
struct Inner {
    fields: BTreeMap<LedgerField, String>,
    deployed: bool,
    unavailable: Option<String>,
    finalize_status: Option<String>,
    history: Vec<LedgerMutation>,
}

/// Thread-safe in-memory contract state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<RwLock<Inner>>,
    height: Arc<AtomicU64>,
}

impl InMemoryLedger {
    /// A ledger with no state; reads return `Ok(None)` until the first
    /// mutation or seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a field with a map.
    pub fn seed(&self, field: LedgerField, map: &LedgerMap) {
        let mut inner = self.inner.write();
        inner.fields.insert(field, serialize_map(map));
        inner.deployed = true;
    }

    /// Overwrite a field with raw text, bypassing the codec.
    pub fn seed_raw(&self, field: LedgerField, raw: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.fields.insert(field, raw.into());
        inner.deployed = true;
    }

    /// Make subsequent reads fail with [`LedgerError::Unavailable`].
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.inner.write().unavailable = reason.map(str::to_string);
    }

    /// Fail subsequent mutations as if they finalized with this status,
    /// leaving state untouched.
    pub fn set_finalize_status(&self, status: Option<&str>) {
        self.inner.write().finalize_status = status.map(str::to_string);
    }

    /// Every accepted mutation, oldest first.
    pub fn history(&self) -> Vec<LedgerMutation> {
        self.inner.read().history.clone()
    }

    fn snapshot_raw(&self) -> Result<Option<RawLedgerFields>, LedgerError> {
        let inner = self.inner.read();
        if let Some(reason) = &inner.unavailable {
            return Err(LedgerError::Unavailable(reason.clone()));
        }
        if !inner.deployed {
            return Ok(None);
        }
        let mut raw = RawLedgerFields::new();
        for (field, text) in &inner.fields {
            raw.insert(*field, Value::String(text.clone()));
        }
        Ok(Some(raw))
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn fetch_raw_fields(&self) -> Result<Option<RawLedgerFields>, LedgerError> {
        self.snapshot_raw()
    }
}

#[async_trait]
impl LedgerMutator for InMemoryLedger {
    async fn submit_update(&self, mutation: LedgerMutation) -> Result<MutationReceipt, LedgerError> {
        // Yield so concurrent submitters interleave the way real network
        // calls would.
        tokio::task::yield_now().await;

        let fields = mutation.circuit.fields();
        if mutation.arguments.len() != fields.len() {
            return Err(LedgerError::Gateway {
                endpoint: mutation.circuit.as_str().to_string(),
                status: 400,
                body: format!(
                    "expected {} arguments, got {}",
                    fields.len(),
                    mutation.arguments.len()
                ),
            });
        }

        let block_height = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_id = uuid::Uuid::new_v4().to_string();
        let mut inner = self.inner.write();

        if let Some(status) = inner.finalize_status.clone() {
            return Err(LedgerError::TransactionFailed {
                circuit: mutation.circuit.as_str().to_string(),
                transaction_id,
                status,
            });
        }

        for (field, argument) in fields.iter().zip(&mutation.arguments) {
            inner.fields.insert(*field, argument.clone());
        }
        inner.deployed = true;
        inner.history.push(mutation);

        Ok(MutationReceipt {
            transaction_id,
            block_height: Some(block_height),
            status: SUCCESS_STATUS.to_string(),
            public_data: None,
        })
    }
}
