//! # File-Backed Proof Store
//!
//! All proofs live in one JSON document:
//!
//! ```text
//! { "<proof key>": { "proof": { ... }, "expiresAt": "<RFC 3339>" }, ... }
//! ```
//!
//! Every operation reads the document, applies its change, and writes it
//! back through a temporary file and a rename, so a crash mid-write leaves
//! the previous document intact. Operations are serialized by an async
//! mutex; concurrent writers to the same key resolve to the last write.
//!
//! Entries are decoded one by one. An entry that cannot be decoded is
//! logged, hidden from readers and written back unchanged, so it survives
//! later writes. A document that is not a JSON object at all is logged and
//! treated as an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kyc_core::Timestamp;
use kyc_zkp::PresentedProof;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::key::ProofKey;
use crate::store::{ProofStore, StoredProof};

#[derive(Debug, Default)]
struct Document {
    entries: BTreeMap<String, StoredProof>,
    /// Entries kept verbatim because they did not decode.
    unreadable: Map<String, Value>,
}

impl Document {
    fn insert(&mut self, key: String, entry: StoredProof) {
        self.unreadable.remove(&key);
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &str) -> bool {
        let unreadable = self.unreadable.remove(key).is_some();
        self.entries.remove(key).is_some() || unreadable
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut out = self.unreadable.clone();
        for (key, entry) in &self.entries {
            out.insert(key.clone(), serde_json::to_value(entry)?);
        }
        Ok(Value::Object(out))
    }
}

/// Proof store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileProofStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileProofStore {
    /// Open (or lazily create) the store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::default()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(Document::default());
        }
        let raw = match serde_json::from_str::<Map<String, Value>>(&text) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "proof store file is corrupt, treating as empty"
                );
                return Ok(Document::default());
            }
        };
        let mut doc = Document::default();
        for (key, value) in raw {
            match serde_json::from_value::<StoredProof>(value.clone()) {
                Ok(entry) => {
                    doc.entries.insert(key, entry);
                }
                Err(e) => {
                    let short: String = key.chars().take(16).collect();
                    tracing::warn!(key = %short, error = %e, "skipping undecodable proof entry");
                    doc.unreadable.insert(key, value);
                }
            }
        }
        Ok(doc)
    }

    async fn save(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        let body = serde_json::to_vec_pretty(&doc.to_value()?)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "proofs.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn sweep(doc: &mut Document, now: Timestamp) -> usize {
    let before = doc.entries.len();
    doc.entries.retain(|_, entry| !entry.is_expired_at(now));
    before - doc.entries.len()
}

#[async_trait]
impl ProofStore for FileProofStore {
    async fn store_until(
        &self,
        key: &ProofKey,
        proof: PresentedProof,
        expires_at: Timestamp,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        doc.insert(key.to_string(), StoredProof::until(proof, expires_at));
        self.save(&doc).await?;
        tracing::debug!(subject = %key.subject().short(), category = %key.category(), "proof stored");
        Ok(())
    }

    async fn get(&self, key: &ProofKey) -> Result<Option<StoredProof>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let rendered = key.to_string();
        let Some(entry) = doc.entries.remove(&rendered) else {
            return Ok(None);
        };
        if entry.is_expired_at(Timestamp::now()) {
            self.save(&doc).await?;
            tracing::debug!(subject = %key.subject().short(), "evicted expired proof");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn remove(&self, key: &ProofKey) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let existed = doc.remove(&key.to_string());
        if existed {
            self.save(&doc).await?;
        }
        Ok(existed)
    }

    async fn list_valid(&self) -> Result<Vec<(ProofKey, StoredProof)>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        if sweep(&mut doc, Timestamp::now()) > 0 {
            self.save(&doc).await?;
        }
        let mut entries = Vec::with_capacity(doc.entries.len());
        for (raw, entry) in doc.entries {
            match ProofKey::parse(&raw) {
                Ok(key) => entries.push((key, entry)),
                Err(_) => tracing::warn!(key = %raw, "skipping proof stored under malformed key"),
            }
        }
        Ok(entries)
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let removed = sweep(&mut doc, Timestamp::now());
        if removed > 0 {
            self.save(&doc).await?;
            tracing::info!(removed, "swept expired proofs");
        }
        Ok(removed)
    }
}
