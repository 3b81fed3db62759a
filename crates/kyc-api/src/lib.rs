//! # kyc-api — HTTP Surface for the KYC Commitment Ledger
//!
//! ## API Surface
//!
//! | Route | Module | Auth |
//! |-------|--------|------|
//! | `POST /v1/kyc/verify-proof` | [`routes::kyc`] | public |
//! | `GET /v1/kyc/status` | [`routes::kyc`] | public |
//! | `POST /v1/kyc/store-proof` | [`routes::proofs`] | bearer |
//! | `GET /v1/kyc/proofs`, `DELETE /v1/kyc/proofs/{key}`, `POST /v1/kyc/proofs/sweep` | [`routes::proofs`] | bearer |
//! | `POST /v1/kyc/credentials/{category}/issue` | [`routes::issuance`] | bearer |
//! | `POST /v1/kyc/revoke` | [`routes::issuance`] | bearer |
//! | `GET /openapi.json` | [`openapi`] | public |
//! | `GET /health/*`, `GET /metrics` | this module | public |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CORS → TraceLayer → MetricsMiddleware → [AuthMiddleware] → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Request bodies above this size are rejected with 413.
const MAX_BODY_BYTES: usize = 256 * 1024;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and `/metrics` sit outside the CORS and trace layers.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let cors = cors_layer(&state.config.allowed_origins);

    let protected = Router::new()
        .merge(routes::proofs::router())
        .merge(routes::issuance::router())
        .route_layer(from_fn(auth::auth_middleware));

    let api = Router::new()
        .merge(routes::kyc::router())
        .merge(protected)
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(auth_config))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// CORS allow-list. Origins that are not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE)
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}

/// GET /metrics — Prometheus text exposition.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
