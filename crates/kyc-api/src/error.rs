//! # API Error Types
//!
//! [`AppError`] is what every handler returns. It maps core, engine,
//! ledger, issuance and store errors to HTTP status codes with a JSON
//! body `{ "error": { "code", "message" } }`. Internal details are logged,
//! never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kyc_core::CoreError;
use kyc_engine::EngineError;
use kyc_ledger::{IssuanceError, LedgerError};
use kyc_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Error envelope returned by every failing route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Safe to show to a caller; never contains ledger internals.
    pub message: String,
}

/// Handler error. The variant picks the status code and `code` string.
#[derive(Error, Debug)]
pub enum AppError {
    /// No proof stored under the requested key (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Identifier or commitment failed core validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request could not be parsed or names an unsupported option (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The ledger rejected a state change (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A dependency (ledger, verifier) is unreachable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::ServiceUnavailable(_) => "A required service is unavailable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "dependency unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedProofType(_) => Self::BadRequest(err.to_string()),
            CoreError::Canonicalization(_) => Self::BadRequest(err.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidIdentifier(msg) => Self::Validation(msg),
            EngineError::UnsupportedProofType(msg) => Self::BadRequest(msg),
            EngineError::LedgerUnavailable(msg) => Self::ServiceUnavailable(msg),
            EngineError::Verifier(e) => Self::ServiceUnavailable(e.to_string()),
            EngineError::Storage(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TransactionFailed { .. } => Self::Conflict(err.to_string()),
            LedgerError::Config(_) => Self::Internal(err.to_string()),
            other => Self::ServiceUnavailable(other.to_string()),
        }
    }
}

impl From<IssuanceError> for AppError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::Core(e) => e.into(),
            IssuanceError::Ledger(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey(key) => Self::BadRequest(format!("invalid proof key {key:?}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("disk full at /var".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(!body.error.message.contains("/var"));
    }

    #[tokio::test]
    async fn unavailable_hides_details() {
        let (status, body) =
            response_parts(AppError::ServiceUnavailable("10.0.0.4 refused".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.message.contains("10.0.0.4"));
    }

    #[tokio::test]
    async fn bad_request_carries_message() {
        let (_, body) = response_parts(AppError::BadRequest("subjectKey is required".into())).await;
        assert!(body.error.message.contains("subjectKey is required"));
    }

    #[test]
    fn engine_errors_map_to_http_classes() {
        let err: AppError = EngineError::UnsupportedProofType("nope".into()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err: AppError = EngineError::LedgerUnavailable("down".into()).into();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
        let err: AppError = EngineError::InvalidIdentifier("blank".into()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn failed_transaction_is_conflict() {
        let err: AppError = LedgerError::TransactionFailed {
            circuit: "issueAgeCredential".into(),
            transaction_id: "tx".into(),
            status: "FailFallible".into(),
        }
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
