//! # kyc-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. See [`kyc_api::config`] for the
//! environment variables it reads.

use std::sync::Arc;

use kyc_api::config::{AppConfig, ProofStoreBackend};
use kyc_api::state::AppState;
use kyc_ledger::{HttpLedgerClient, InMemoryLedger};
use kyc_store::{FileProofStore, MemoryProofStore, PgProofStore, ProofStore};
use kyc_zkp::VerifierRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load().map_err(|e| {
        tracing::error!("Configuration invalid: {e}");
        e
    })?;
    tracing::debug!(?config, "configuration loaded");

    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set: proof storage and issuance routes are unauthenticated");
    }

    let proofs: Arc<dyn ProofStore> = match config.proof_store {
        ProofStoreBackend::Memory => {
            tracing::warn!("Using in-memory proof store; proofs are lost on restart");
            Arc::new(MemoryProofStore::new())
        }
        ProofStoreBackend::File => {
            tracing::info!(path = %config.proof_store_path.display(), "Using file proof store");
            Arc::new(FileProofStore::new(config.proof_store_path.clone()))
        }
        ProofStoreBackend::Postgres => {
            let url = config.database_url.clone().unwrap_or_default();
            let pool = kyc_store::postgres::connect(&url).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            tracing::info!("Using Postgres proof store");
            Arc::new(PgProofStore::new(pool))
        }
    };

    // Verifying keys are loaded lazily on first use per category.
    let verifiers = VerifierRegistry::mock();

    let state = match config.ledger.clone() {
        Some(ledger_config) => {
            tracing::info!(
                gateway = %ledger_config.base_url,
                contract = %ledger_config.contract_address,
                "Ledger gateway configured"
            );
            let client = Arc::new(HttpLedgerClient::new(ledger_config)?);
            AppState::new(config.clone(), client.clone(), client, proofs, verifiers)
        }
        None => {
            tracing::warn!("KYC_LEDGER_URL not set: running against an in-memory ledger");
            AppState::with_memory_ledger(config.clone(), InMemoryLedger::new(), proofs, verifiers)
        }
    };

    let state = match kyc_api::middleware::metrics::install_recorder() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            tracing::warn!("Prometheus recorder not installed: {e}");
            state
        }
    };

    let app = kyc_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("KYC API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` sets the filter.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
