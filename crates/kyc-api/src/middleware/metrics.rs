//! # Prometheus Metrics
//!
//! Request counters and latency histograms recorded through the `metrics`
//! facade and rendered by the Prometheus exporter at `/metrics`.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `kyc_http_requests_total` | counter | `method`, `route`, `status` |
//! | `kyc_http_request_duration_seconds` | histogram | `method`, `route` |
//! | `kyc_verifications_total` | counter | `category`, `outcome` (recorded by the engine) |

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "kyc_http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "kyc_http_request_duration_seconds";

/// Install the global Prometheus recorder.
///
/// Fails if a recorder is already installed in this process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record one request. Unmatched paths share the `unmatched` route label.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, "method" => method, "route" => route)
        .record(started.elapsed().as_secs_f64());

    response
}
