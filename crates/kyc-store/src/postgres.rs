//! # PostgreSQL Proof Store
//!
//! Proofs live in the `kyc_proofs` table (`key`, `proof` JSONB,
//! `expires_at`). The schema is applied by [`migrate`] from the embedded
//! migrations in `crates/kyc-store/migrations`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kyc_core::Timestamp;
use kyc_zkp::PresentedProof;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::StoreError;
use crate::key::ProofKey;
use crate::store::{ProofStore, StoredProof};

/// Connect to `url` and apply the embedded migrations.
pub async fn connect(url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!("Connected to PostgreSQL");
    migrate(&pool).await?;
    Ok(pool)
}

/// Apply the embedded `kyc_proofs` migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Proof store migrations applied");
    Ok(())
}

/// Proof store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgProofStore {
    pool: PgPool,
}

impl PgProofStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProofRow {
    key: String,
    proof: serde_json::Value,
    expires_at: DateTime<Utc>,
}

impl ProofRow {
    fn into_entry(self) -> Result<StoredProof, StoreError> {
        let proof: PresentedProof = serde_json::from_value(self.proof)?;
        Ok(StoredProof::until(proof, Timestamp::from_utc(self.expires_at)))
    }
}

#[async_trait]
impl ProofStore for PgProofStore {
    async fn store_until(
        &self,
        key: &ProofKey,
        proof: PresentedProof,
        expires_at: Timestamp,
    ) -> Result<(), StoreError> {
        let proof_json = serde_json::to_value(&proof)?;
        sqlx::query(
            "INSERT INTO kyc_proofs (key, proof, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET proof = EXCLUDED.proof, expires_at = EXCLUDED.expires_at",
        )
        .bind(key.to_string())
        .bind(&proof_json)
        .bind(*expires_at.as_datetime())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &ProofKey) -> Result<Option<StoredProof>, StoreError> {
        let row = sqlx::query_as::<_, ProofRow>(
            "SELECT key, proof, expires_at FROM kyc_proofs WHERE key = $1",
        )
        .bind(key.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let entry = row.into_entry()?;
        if entry.is_expired_at(Timestamp::now()) {
            sqlx::query("DELETE FROM kyc_proofs WHERE key = $1 AND expires_at <= $2")
                .bind(key.to_string())
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
            tracing::debug!(subject = %key.subject().short(), "evicted expired proof");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn remove(&self, key: &ProofKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kyc_proofs WHERE key = $1")
            .bind(key.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_valid(&self) -> Result<Vec<(ProofKey, StoredProof)>, StoreError> {
        self.sweep_expired().await?;
        let rows = sqlx::query_as::<_, ProofRow>(
            "SELECT key, proof, expires_at FROM kyc_proofs ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let key = match ProofKey::parse(&row.key) {
                Ok(key) => key,
                Err(_) => {
                    tracing::warn!(key = %row.key, "skipping proof stored under malformed key");
                    continue;
                }
            };
            entries.push((key, row.into_entry()?));
        }
        Ok(entries)
    }

    async fn sweep_expired(&self) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM kyc_proofs WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() as usize;
        if removed > 0 {
            tracing::info!(removed, "swept expired proofs");
        }
        Ok(removed)
    }
}
