//! # Verification and Status
//!
//! Public read endpoints. Relying parties ask whether a holder satisfies a
//! predicate; holders list the credentials the ledger records for them.
//! Neither response ever contains a private attribute value.
//!
//! ## Endpoints
//!
//! - `POST /v1/kyc/verify-proof` — Verify an age, country or captcha predicate.
//! - `GET /v1/kyc/status?wallet=` — Credential status for a wallet.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kyc_engine::{resolve_category, CredentialStatusView, VerificationOutcome, VerificationRequest};
use kyc_ledger::{CredentialRecord, KycStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, non_blank, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/kyc/verify-proof`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofRequest {
    /// Wallet address or other holder identifier.
    #[serde(alias = "wallet")]
    pub holder_identifier: Option<String>,
    /// Commitment the relying party expects the ledger to hold.
    pub commitment: Option<String>,
    /// `age`, `country` or `captcha`. Defaults to `age`.
    #[serde(alias = "proofType")]
    pub category: Option<String>,
    /// Proof envelope as a JSON object or JSON text. When absent the stored
    /// proof for the holder is used.
    #[schema(value_type = Object)]
    pub proof: Option<serde_json::Value>,
}

impl Validate for VerifyProofRequest {
    fn validate(&self) -> Result<(), String> {
        match (non_blank(&self.holder_identifier), non_blank(&self.commitment)) {
            (Some(_), Some(_)) => Ok(()),
            _ => Err("wallet and commitment are required".to_string()),
        }
    }
}

/// Verification result. Exactly one of the predicate fields is present
/// when a proof was considered.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofResponse {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_adult: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_france: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// `revoked`, `no_credential`, `commitment_mismatch`,
    /// `no_proof_available` or `proof_invalid`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_reference: Option<String>,
}

impl From<VerificationOutcome> for VerifyProofResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        let predicate = |name: &str| {
            outcome
                .disclosed
                .filter(|_| outcome.predicate_name() == name)
        };
        Self {
            verified: outcome.verified,
            is_adult: predicate("isAdult"),
            is_france: predicate("isFrance"),
            captcha_passed: predicate("captchaPassed"),
            reason: outcome.message.clone(),
            reason_code: outcome.reason.map(|r| r.code().to_string()),
            commitment: outcome.commitment.clone(),
            proof_reference: outcome.proof_reference.clone(),
        }
    }
}

/// Query string for `GET /v1/kyc/status`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StatusQuery {
    /// Holder wallet address.
    pub wallet: Option<String>,
}

/// Credential status for one wallet. Predicate values are never included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusResponse {
    pub wallet: String,
    /// Subject key the ledger maps are keyed by.
    pub subject_hash: String,
    /// `identity`, `human` and `age` status summary.
    #[schema(value_type = Object)]
    pub kyc_status: KycStatus,
    #[schema(value_type = Vec<Object>)]
    pub credentials: Vec<CredentialRecord>,
}

impl From<CredentialStatusView> for CredentialStatusResponse {
    fn from(view: CredentialStatusView) -> Self {
        Self {
            wallet: view.wallet,
            subject_hash: view.subject_hash.as_str().to_string(),
            kyc_status: view.kyc_status,
            credentials: view.credentials,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/kyc/verify-proof", post(verify_proof))
        .route("/v1/kyc/status", get(credential_status))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/kyc/verify-proof — Verify a predicate proof for a holder.
///
/// Checks revocation, credential presence and the commitment before any
/// proof is examined. A negative result is a `200` with `verified: false`
/// and a reason; only malformed requests and outages are errors.
#[utoipa::path(
    post,
    path = "/v1/kyc/verify-proof",
    request_body = VerifyProofRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyProofResponse),
        (status = 400, description = "Missing fields or unknown proof type", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger or verifier unavailable", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub async fn verify_proof(
    State(state): State<AppState>,
    body: Result<Json<VerifyProofRequest>, JsonRejection>,
) -> Result<Json<VerifyProofResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let category = resolve_category(req.category.as_deref())?;
    let request = VerificationRequest {
        category,
        holder_identifier: non_blank(&req.holder_identifier).unwrap_or_default().to_string(),
        commitment: non_blank(&req.commitment).unwrap_or_default().to_string(),
        proof: req.proof.filter(|p| !p.is_null()),
    };
    let outcome = state.engine.verify(&request).await?;
    Ok(Json(outcome.into()))
}

/// GET /v1/kyc/status — Credential status for a wallet.
///
/// Reads the ledger fresh on every call. An unreachable ledger yields an
/// empty status rather than an error.
#[utoipa::path(
    get,
    path = "/v1/kyc/status",
    params(StatusQuery),
    responses(
        (status = 200, description = "Credential status", body = CredentialStatusResponse),
        (status = 400, description = "Missing wallet", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub async fn credential_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<CredentialStatusResponse>, AppError> {
    let wallet = non_blank(&query.wallet)
        .ok_or_else(|| AppError::BadRequest("wallet query parameter is required".into()))?;
    let view = state.status.status(wallet).await?;
    Ok(Json(view.into()))
}
