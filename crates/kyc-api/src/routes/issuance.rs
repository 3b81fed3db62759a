//! # Issuance and Revocation
//!
//! Authenticated issuer endpoints that write commitments to the ledger.
//! The commitment is either supplied directly or derived from the
//! credential data with the canonical credential hash; the credential
//! data itself is never written anywhere.
//!
//! ## Endpoints
//!
//! - `POST /v1/kyc/credentials/{category}/issue` — Record a commitment.
//! - `POST /v1/kyc/revoke` — Revoke a subject.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use kyc_core::{derive_subject_key, generate_credential_hash, CommitmentHash, CredentialCategory};
use kyc_ledger::{IssuanceReceipt, IssuanceRequest, RevocationRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, non_blank, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for credential issuance.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialRequest {
    #[serde(alias = "wallet")]
    pub holder_identifier: Option<String>,
    /// Precomputed commitment. Mutually exclusive with `credentialData`.
    pub commitment: Option<String>,
    /// Claims to commit to. Hashed canonically, never stored.
    #[schema(value_type = Object)]
    pub credential_data: Option<serde_json::Value>,
    pub proof_reference: Option<String>,
    pub issuer: Option<String>,
}

impl Validate for IssueCredentialRequest {
    fn validate(&self) -> Result<(), String> {
        if non_blank(&self.holder_identifier).is_none() || non_blank(&self.issuer).is_none() {
            return Err("holderIdentifier and issuer are required".to_string());
        }
        let has_data = self.credential_data.as_ref().is_some_and(|v| !v.is_null());
        match (non_blank(&self.commitment).is_some(), has_data) {
            (true, false) | (false, true) => Ok(()),
            _ => Err("exactly one of commitment or credentialData is required".to_string()),
        }
    }
}

/// Request body for revocation.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    #[serde(alias = "wallet")]
    pub holder_identifier: Option<String>,
    pub reason: Option<String>,
    pub issuer: Option<String>,
    pub credential_id: Option<String>,
}

impl Validate for RevokeRequest {
    fn validate(&self) -> Result<(), String> {
        match (
            non_blank(&self.holder_identifier),
            non_blank(&self.reason),
            non_blank(&self.issuer),
        ) {
            (Some(_), Some(_), Some(_)) => Ok(()),
            _ => Err("holderIdentifier, reason and issuer are required".to_string()),
        }
    }
}

/// Acknowledged ledger mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceReceiptResponse {
    pub circuit: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    pub status: String,
    pub commitment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_reference: Option<String>,
}

impl From<IssuanceReceipt> for IssuanceReceiptResponse {
    fn from(receipt: IssuanceReceipt) -> Self {
        Self {
            circuit: receipt.circuit.as_str().to_string(),
            transaction_id: receipt.transaction_id,
            block_height: receipt.block_height,
            status: receipt.status,
            commitment: receipt.commitment.as_str().to_string(),
            proof_reference: receipt.proof_reference,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/kyc/credentials/{category}/issue", post(issue_credential))
        .route("/v1/kyc/revoke", post(revoke_credential))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/kyc/credentials/{category}/issue — Record a commitment.
///
/// Merges the holder's entry into the category's commitment, proof
/// reference and issuer maps and submits all three in one circuit call.
#[utoipa::path(
    post,
    path = "/v1/kyc/credentials/{category}/issue",
    params(("category" = String, Path, description = "identity, age, human or country")),
    request_body = IssueCredentialRequest,
    responses(
        (status = 201, description = "Commitment recorded", body = IssuanceReceiptResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorBody),
        (status = 409, description = "Ledger rejected the transaction", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger unavailable", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "issuance"
)]
pub async fn issue_credential(
    State(state): State<AppState>,
    Path(category): Path<String>,
    body: Result<Json<IssueCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuanceReceiptResponse>), AppError> {
    let category: CredentialCategory = category
        .parse()
        .map_err(|e: kyc_core::CoreError| AppError::BadRequest(e.to_string()))?;
    let req = extract_validated_json(body)?;

    let subject = derive_subject_key(non_blank(&req.holder_identifier).unwrap_or_default())?;
    let commitment = match (non_blank(&req.commitment), &req.credential_data) {
        (Some(commitment), _) => CommitmentHash::new(commitment)?,
        (None, Some(data)) => generate_credential_hash(data)?,
        (None, None) => {
            return Err(AppError::BadRequest(
                "exactly one of commitment or credentialData is required".into(),
            ))
        }
    };

    let receipt = state
        .issuer
        .issue(&IssuanceRequest {
            category,
            subject,
            commitment,
            proof_reference: req.proof_reference.clone(),
            issuer: non_blank(&req.issuer).unwrap_or_default().to_string(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// POST /v1/kyc/revoke — Revoke a subject.
///
/// Revocation is subject-wide: every later verification for the holder
/// fails with `revoked`, whatever the category.
#[utoipa::path(
    post,
    path = "/v1/kyc/revoke",
    request_body = RevokeRequest,
    responses(
        (status = 200, description = "Subject revoked", body = IssuanceReceiptResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorBody),
        (status = 409, description = "Ledger rejected the transaction", body = crate::error::ErrorBody),
        (status = 503, description = "Ledger unavailable", body = crate::error::ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "issuance"
)]
pub async fn revoke_credential(
    State(state): State<AppState>,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<Json<IssuanceReceiptResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let subject = derive_subject_key(non_blank(&req.holder_identifier).unwrap_or_default())?;
    let receipt = state
        .issuer
        .revoke(&RevocationRequest {
            subject,
            reason: non_blank(&req.reason).unwrap_or_default().to_string(),
            issuer: non_blank(&req.issuer).unwrap_or_default().to_string(),
            credential_id: non_blank(&req.credential_id).map(str::to_string),
        })
        .await?;
    Ok(Json(receipt.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issuance_needs_exactly_one_commitment_source() {
        let both: IssueCredentialRequest = serde_json::from_value(json!({
            "wallet": "w", "issuer": "i", "commitment": "0xa", "credentialData": {"age": 30}
        }))
        .unwrap();
        assert!(both.validate().is_err());

        let neither: IssueCredentialRequest =
            serde_json::from_value(json!({"wallet": "w", "issuer": "i"})).unwrap();
        assert!(neither.validate().is_err());

        let data: IssueCredentialRequest = serde_json::from_value(json!({
            "holderIdentifier": "w", "issuer": "i", "credentialData": {"age": 30}
        }))
        .unwrap();
        assert!(data.validate().is_ok());
    }

    #[test]
    fn revocation_needs_reason() {
        let req: RevokeRequest =
            serde_json::from_value(json!({"wallet": "w", "issuer": "i"})).unwrap();
        assert!(req.validate().is_err());
    }
}
