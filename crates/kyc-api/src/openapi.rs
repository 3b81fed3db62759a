//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "KYC Commitment Ledger API",
        version = "0.1.0",
        description = "Privacy-preserving credential verification: predicate proofs checked against on-ledger commitments."
    ),
    paths(
        crate::routes::kyc::verify_proof,
        crate::routes::kyc::credential_status,
        crate::routes::proofs::store_proof,
        crate::routes::proofs::list_proofs,
        crate::routes::proofs::remove_proof,
        crate::routes::proofs::sweep_proofs,
        crate::routes::issuance::issue_credential,
        crate::routes::issuance::revoke_credential,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::kyc::VerifyProofRequest,
        crate::routes::kyc::VerifyProofResponse,
        crate::routes::kyc::CredentialStatusResponse,
        crate::routes::proofs::StoreProofRequest,
        crate::routes::proofs::StoreProofResponse,
        crate::routes::proofs::StoredProofSummary,
        crate::routes::proofs::SweepResponse,
        crate::routes::issuance::IssueCredentialRequest,
        crate::routes::issuance::RevokeRequest,
        crate::routes::issuance::IssuanceReceiptResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "verification", description = "Predicate verification and credential status"),
        (name = "proofs", description = "Proof storage"),
        (name = "issuance", description = "Commitment issuance and revocation"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
