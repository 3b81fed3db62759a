//! # Bearer Token Authentication
//!
//! Write and admin routes (proof storage, issuance, revocation) require
//! `Authorization: Bearer <AUTH_TOKEN>`. Verification and status routes
//! are public: relying parties and holders call them without credentials.
//!
//! When no token is configured, authentication is disabled and every
//! request passes. `main` logs a warning at startup in that case.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejection;
use axum_extra::TypedHeader;
use subtle::ConstantTimeEq;

use crate::error::{ErrorBody, ErrorDetail};

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ a dummy comparison still runs so the early return
/// does not stand out in timing.
pub(crate) fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Reject requests whose bearer token does not match [`AuthConfig::token`].
pub async fn auth_middleware(
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    request: Request,
    next: Next,
) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|cfg| cfg.token.clone());

    let Some(expected) = expected else {
        return next.run(request).await;
    };

    match bearer {
        Ok(TypedHeader(Authorization(bearer))) => {
            if constant_time_token_eq(bearer.token(), &expected) {
                next.run(request).await
            } else {
                tracing::warn!(path = %request.uri().path(), "authentication failed: invalid bearer token");
                unauthorized_response("invalid bearer token")
            }
        }
        Err(rejection) if rejection.is_missing() => {
            tracing::warn!(path = %request.uri().path(), "authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn guarded(token: Option<&str>) -> Router {
        Router::new()
            .route("/guarded", get(|| async { "ok" }))
            .layer(from_fn(auth_middleware))
            .layer(Extension(AuthConfig {
                token: token.map(str::to_string),
            }))
    }

    async fn status_of(app: Router, authorization: Option<&str>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri("/guarded");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn token_comparison() {
        assert!(constant_time_token_eq("secret", "secret"));
        assert!(!constant_time_token_eq("secret", "secreT"));
        assert!(!constant_time_token_eq("sec", "secret"));
        assert!(!constant_time_token_eq("", "secret"));
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = AuthConfig {
            token: Some("hunter2".into()),
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn disabled_auth_lets_everything_through() {
        assert_eq!(status_of(guarded(None), None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn valid_token_accepted() {
        assert_eq!(
            status_of(guarded(Some("s3cret")), Some("Bearer s3cret")).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn wrong_missing_or_non_bearer_rejected() {
        assert_eq!(
            status_of(guarded(Some("s3cret")), Some("Bearer nope")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(guarded(Some("s3cret")), None).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(guarded(Some("s3cret")), Some("Basic czNjcmV0")).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
