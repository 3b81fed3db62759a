//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Every field is cheap to clone: services hold
//! their dependencies behind `Arc`.

use std::sync::Arc;

use kyc_engine::{CredentialStatusService, ProofVerificationEngine};
use kyc_ledger::{
    CommitmentIssuanceCoordinator, InMemoryLedger, LedgerHydrator, LedgerMutator, LedgerReader,
};
use kyc_store::ProofStore;
use kyc_zkp::VerifierRegistry;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::AppConfig;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: ProofVerificationEngine,
    pub status: CredentialStatusService,
    pub issuer: Arc<CommitmentIssuanceCoordinator>,
    pub proofs: Arc<dyn ProofStore>,
    pub config: AppConfig,
    /// Prometheus render handle. `None` when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("issuer", &self.issuer)
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services over one ledger and one proof store.
    pub fn new(
        config: AppConfig,
        reader: Arc<dyn LedgerReader>,
        mutator: Arc<dyn LedgerMutator>,
        proofs: Arc<dyn ProofStore>,
        verifiers: VerifierRegistry,
    ) -> Self {
        let engine = ProofVerificationEngine::new(reader.clone(), proofs.clone(), verifiers);
        let status = CredentialStatusService::new(reader.clone(), LedgerHydrator::new());
        let issuer = Arc::new(CommitmentIssuanceCoordinator::new(reader, mutator));
        Self {
            engine,
            status,
            issuer,
            proofs,
            config,
            metrics: None,
        }
    }

    /// State backed by an in-memory ledger, for local development and tests.
    pub fn with_memory_ledger(
        config: AppConfig,
        ledger: InMemoryLedger,
        proofs: Arc<dyn ProofStore>,
        verifiers: VerifierRegistry,
    ) -> Self {
        let ledger = Arc::new(ledger);
        Self::new(config, ledger.clone(), ledger, proofs, verifiers)
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
