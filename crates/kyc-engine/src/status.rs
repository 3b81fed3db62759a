//! # Credential Status
//!
//! The holder-facing view: which credentials the ledger holds for a wallet.
//! Ledger failures degrade to an empty view; predicate keys are stripped
//! from every record before it leaves this module.

use std::sync::Arc;

use kyc_core::{derive_subject_key, SubjectKey};
use kyc_ledger::{read_snapshot_or_empty, CredentialRecord, KycStatus, LedgerHydrator, LedgerReader};
use serde::Serialize;

use crate::error::EngineError;

/// Status view for one wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusView {
    pub wallet: String,
    pub subject_hash: SubjectKey,
    pub kyc_status: KycStatus,
    pub credentials: Vec<CredentialRecord>,
}

/// Builds [`CredentialStatusView`]s from fresh ledger reads.
#[derive(Clone)]
pub struct CredentialStatusService {
    ledger: Arc<dyn LedgerReader>,
    hydrator: LedgerHydrator,
}

impl CredentialStatusService {
    pub fn new(ledger: Arc<dyn LedgerReader>, hydrator: LedgerHydrator) -> Self {
        Self { ledger, hydrator }
    }

    /// Status for `wallet`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidIdentifier`] if `wallet` is blank.
    pub async fn status(&self, wallet: &str) -> Result<CredentialStatusView, EngineError> {
        let subject = derive_subject_key(wallet)?;
        let snapshot = read_snapshot_or_empty(self.ledger.as_ref()).await;
        let hydrated = self.hydrator.hydrate(&snapshot, Some(wallet));
        tracing::debug!(
            subject = subject.short(),
            credentials = hydrated.credentials.len(),
            "credential status hydrated"
        );
        Ok(CredentialStatusView {
            wallet: wallet.to_string(),
            subject_hash: subject,
            kyc_status: hydrated.kyc_status,
            credentials: hydrated
                .credentials
                .iter()
                .map(CredentialRecord::redacted)
                .collect(),
        })
    }
}
