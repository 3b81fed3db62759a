//! The HTTP API wired to an `HttpLedgerClient` reading a mock ledger
//! gateway. Covers the deployment shape where the ledger is remote: state
//! arrives as enveloped JSON-text fields, proofs live in a file store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kyc_api::config::AppConfig;
use kyc_api::state::AppState;
use kyc_core::{derive_subject_key, CommitmentHash, ProofCategory};
use kyc_ledger::{HttpLedgerClient, LedgerClientConfig};
use kyc_store::FileProofStore;
use kyc_zkp::{MockPredicateProver, VerifierRegistry};

const CONTRACT: &str = "0200feedface";
const TOKEN: &str = "gateway-test-token";
const WALLET: &str = "mn_addr_gateway1";

fn app(server: &MockServer, store_path: std::path::PathBuf) -> Router {
    let config = LedgerClientConfig::new(&server.uri(), CONTRACT, None, 5).unwrap();
    let client = Arc::new(HttpLedgerClient::new(config).unwrap());
    let app_config = AppConfig {
        auth_token: Some(TOKEN.to_string()),
        ..AppConfig::default()
    };
    let state = AppState::new(
        app_config,
        client.clone(),
        client,
        Arc::new(FileProofStore::new(store_path)),
        VerifierRegistry::mock(),
    );
    kyc_api::app(state)
}

async fn mount_state(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/contracts/{CONTRACT}/state")))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Gateway state holding an age commitment for [`WALLET`].
fn age_state(commitment: &str, revoked: bool) -> Value {
    let subject = derive_subject_key(WALLET).unwrap();
    let ages = json!({ subject.as_str(): commitment }).to_string();
    let refs = json!({ subject.as_str(): "ref-gateway" }).to_string();
    let revoked_map = if revoked {
        json!({ subject.as_str(): "revoked" }).to_string()
    } else {
        "{}".to_string()
    };
    json!({
        "ageCommitments": { "value": ages },
        "ageProofRefs": refs,
        "revokedSubjects": { "value": revoked_map },
        "humanCommitments": null
    })
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: bool,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn store_age_proof(app: &Router, commitment: &str) {
    let proof = MockPredicateProver::new()
        .prove(ProofCategory::Age, &CommitmentHash::new(commitment).unwrap(), true)
        .unwrap();
    let subject = derive_subject_key(WALLET).unwrap();
    let (status, _) = send(
        app,
        Method::POST,
        "/v1/kyc/store-proof",
        Some(json!({ "subjectKey": subject.as_str(), "proof": proof })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn verifies_against_gateway_state() {
    let server = MockServer::start().await;
    mount_state(&server, 200, age_state("0xgate", false)).await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, dir.path().join("proofs.json"));

    store_age_proof(&app, "0xgate").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/kyc/verify-proof",
        Some(json!({ "wallet": WALLET, "commitment": "0xgate" })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], json!(true));
    assert_eq!(body["isAdult"], json!(true));
    assert_eq!(body["proofReference"], json!("ref-gateway"));
}

#[tokio::test]
async fn revoked_on_gateway_is_not_verified() {
    let server = MockServer::start().await;
    mount_state(&server, 200, age_state("0xgate", true)).await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, dir.path().join("proofs.json"));

    store_age_proof(&app, "0xgate").await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/v1/kyc/verify-proof",
        Some(json!({ "wallet": WALLET, "commitment": "0xgate" })),
        false,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], json!(false));
    assert_eq!(body["reasonCode"], json!("revoked"));
    assert!(body.get("isAdult").is_none());
}

#[tokio::test]
async fn status_reads_gateway_without_predicates() {
    let server = MockServer::start().await;
    mount_state(&server, 200, age_state("0xgate", false)).await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, dir.path().join("proofs.json"));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/kyc/status?wallet={WALLET}"),
        None,
        false,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kycStatus"]["age"], json!("Verified"));
    assert_eq!(body["kycStatus"]["human"], json!("None"));
    let credentials = body["credentials"].as_array().unwrap();
    assert_eq!(credentials.len(), 1);
    let text = body.to_string();
    assert!(!text.contains("isAdult"));
    assert!(!text.contains("captchaPassed"));
}

#[tokio::test]
async fn gateway_failure_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/contracts/{CONTRACT}/state")))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, dir.path().join("proofs.json"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/v1/kyc/verify-proof",
        Some(json!({ "wallet": WALLET, "commitment": "0xgate" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Status degrades to an empty view rather than failing.
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/kyc/status?wallet={WALLET}"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["credentials"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stored_proofs_survive_an_app_restart() {
    let server = MockServer::start().await;
    mount_state(&server, 200, age_state("0xgate", false)).await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("proofs.json");

    store_age_proof(&app(&server, store_path.clone()), "0xgate").await;

    let restarted = app(&server, store_path);
    let (_, body) = send(
        &restarted,
        Method::POST,
        "/v1/kyc/verify-proof",
        Some(json!({ "wallet": WALLET, "commitment": "0xgate" })),
        false,
    )
    .await;
    assert_eq!(body["verified"], json!(true));
}
