//! # Proof Storage
//!
//! Authenticated endpoints for depositing and administering presented
//! proofs. Proofs are keyed by subject key plus an optional category
//! suffix (`<subject>`, `<subject>:country`, `<subject>:captcha`) and
//! expire after the configured TTL.
//!
//! ## Endpoints
//!
//! - `POST /v1/kyc/store-proof` — Store or replace a proof.
//! - `GET /v1/kyc/proofs` — List unexpired proof keys.
//! - `DELETE /v1/kyc/proofs/{key}` — Remove one proof.
//! - `POST /v1/kyc/proofs/sweep` — Drop expired proofs.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use kyc_store::ProofKey;
use kyc_zkp::PresentedProof;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, non_blank, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/kyc/store-proof`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreProofRequest {
    /// `<subject key>` or `<subject key>:<country|captcha>`.
    pub subject_key: Option<String>,
    /// Proof envelope: `commitment`, `proof`, `statement`.
    #[schema(value_type = Object)]
    pub proof: Option<Value>,
}

impl Validate for StoreProofRequest {
    fn validate(&self) -> Result<(), String> {
        let has_proof = self.proof.as_ref().is_some_and(|p| !p.is_null());
        if non_blank(&self.subject_key).is_none() || !has_proof {
            return Err("subjectKey and proof are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreProofResponse {
    pub success: bool,
    pub message: String,
    /// RFC 3339 expiry of the stored proof.
    pub expires_at: String,
}

/// A stored proof as listed to administrators. Proof contents are omitted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredProofSummary {
    pub key: String,
    pub category: String,
    /// Absent for entries that never expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepResponse {
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/kyc/store-proof", post(store_proof))
        .route("/v1/kyc/proofs", get(list_proofs))
        .route("/v1/kyc/proofs/sweep", post(sweep_proofs))
        .route("/v1/kyc/proofs/{key}", delete(remove_proof))
}

fn parse_envelope(value: &Value) -> Result<PresentedProof, AppError> {
    let parsed;
    let object = match value {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|_| AppError::BadRequest("proof must be a JSON object".into()))?;
            &parsed
        }
        other => other,
    };
    PresentedProof::from_value(object).map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/kyc/store-proof — Store a proof for later verification.
///
/// A second store under the same key replaces the first and restarts its
/// TTL.
#[utoipa::path(
    post,
    path = "/v1/kyc/store-proof",
    request_body = StoreProofRequest,
    responses(
        (status = 200, description = "Proof stored", body = StoreProofResponse),
        (status = 400, description = "Missing fields or invalid envelope", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "proofs"
)]
pub async fn store_proof(
    State(state): State<AppState>,
    body: Result<Json<StoreProofRequest>, JsonRejection>,
) -> Result<Json<StoreProofResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let key = ProofKey::parse(non_blank(&req.subject_key).unwrap_or_default())?;
    let proof = parse_envelope(req.proof.as_ref().unwrap_or(&Value::Null))?;

    let expires_at = state
        .proofs
        .store(&key, proof, state.config.proof_ttl())
        .await?;
    tracing::info!(
        subject = key.subject().short(),
        category = %key.category(),
        "proof stored"
    );
    Ok(Json(StoreProofResponse {
        success: true,
        message: "Proof stored successfully".to_string(),
        expires_at: expires_at.to_iso8601(),
    }))
}

/// GET /v1/kyc/proofs — List unexpired proofs.
#[utoipa::path(
    get,
    path = "/v1/kyc/proofs",
    responses(
        (status = 200, description = "Unexpired proofs", body = Vec<StoredProofSummary>),
        (status = 401, description = "Missing or invalid bearer token", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "proofs"
)]
pub async fn list_proofs(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredProofSummary>>, AppError> {
    let entries = state.proofs.list_valid().await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|(key, stored)| StoredProofSummary {
                category: key.category().to_string(),
                key: key.to_string(),
                expires_at: stored.expires_at.map(|at| at.to_iso8601()),
            })
            .collect(),
    ))
}

/// DELETE /v1/kyc/proofs/{key} — Remove one proof.
#[utoipa::path(
    delete,
    path = "/v1/kyc/proofs/{key}",
    params(("key" = String, Path, description = "Proof key")),
    responses(
        (status = 204, description = "Proof removed"),
        (status = 404, description = "No proof under this key", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "proofs"
)]
pub async fn remove_proof(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = ProofKey::parse(&key)?;
    if state.proofs.remove(&key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no proof stored under {key}")))
    }
}

/// POST /v1/kyc/proofs/sweep — Delete every expired proof.
#[utoipa::path(
    post,
    path = "/v1/kyc/proofs/sweep",
    responses(
        (status = 200, description = "Expired proofs removed", body = SweepResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "proofs"
)]
pub async fn sweep_proofs(State(state): State<AppState>) -> Result<Json<SweepResponse>, AppError> {
    let removed = state.proofs.sweep_expired().await?;
    if removed > 0 {
        tracing::info!(removed, "expired proofs swept");
    }
    Ok(Json(SweepResponse { removed }))
}
