//! # Proof Verification Engine
//!
//! Answers "does this holder satisfy the predicate?" against a fresh ledger
//! snapshot. The steps run in a fixed order and the first one that decides
//! the outcome wins:
//!
//! 1. derive the subject key and read the ledger
//! 2. revoked subject → `revoked`
//! 3. no commitment for the category → `no_credential`
//! 4. caller commitment differs from the ledger → `commitment_mismatch`
//! 5. resolve the proof (caller's, else the proof store) → `no_proof_available`
//! 6. run the category's verifier → `proof_invalid` or verified
//!
//! ## Security Invariant
//!
//! Revocation is checked before any proof is looked at, so a valid proof
//! can never rescue a revoked subject. Neither the holder identifier nor the
//! commitment nor the proof is logged.

use std::sync::Arc;

use kyc_core::{derive_subject_key, CommitmentHash, ProofCategory, SubjectKey};
use kyc_ledger::{read_snapshot, CommitmentLedgerSnapshot, LedgerReader};
use kyc_store::{ProofKey, ProofStore};
use kyc_zkp::{PresentedProof, VerifierRegistry, VerifyError};
use serde_json::Value;

use crate::error::EngineError;
use crate::outcome::{NotVerifiedReason, VerificationOutcome};

/// A relying party's verification request.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub category: ProofCategory,
    pub holder_identifier: String,
    /// Commitment the relying party expects the ledger to hold.
    pub commitment: String,
    /// Optional caller-supplied proof: a JSON object or JSON text.
    pub proof: Option<Value>,
}

/// Resolve a requested category name, defaulting to `age` when absent.
pub fn resolve_category(name: Option<&str>) -> Result<ProofCategory, EngineError> {
    match name.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(ProofCategory::Age),
        Some(name) => Ok(name.parse::<ProofCategory>()?),
    }
}

/// Verifies presented proofs against the commitment ledger.
#[derive(Clone)]
pub struct ProofVerificationEngine {
    ledger: Arc<dyn LedgerReader>,
    proofs: Arc<dyn ProofStore>,
    verifiers: VerifierRegistry,
}

impl std::fmt::Debug for ProofVerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofVerificationEngine")
            .field("verifiers", &self.verifiers)
            .finish_non_exhaustive()
    }
}

impl ProofVerificationEngine {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        proofs: Arc<dyn ProofStore>,
        verifiers: VerifierRegistry,
    ) -> Self {
        Self {
            ledger,
            proofs,
            verifiers,
        }
    }

    /// Run a verification.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidIdentifier`] for a blank holder identifier,
    /// [`EngineError::LedgerUnavailable`] when the ledger cannot be read or
    /// has no state, [`EngineError::Storage`] when the proof store fails,
    /// and [`EngineError::Verifier`] when the verifier cannot run. Every
    /// other result is an `Ok` outcome.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, EngineError> {
        let subject = derive_subject_key(&request.holder_identifier)?;
        let snapshot = read_snapshot(self.ledger.as_ref())
            .await?
            .ok_or_else(|| EngineError::LedgerUnavailable("ledger has no state".into()))?;

        let outcome = self.evaluate(&snapshot, &subject, request).await?;
        record(&subject, &outcome);
        Ok(outcome)
    }

    async fn evaluate(
        &self,
        snapshot: &CommitmentLedgerSnapshot,
        subject: &SubjectKey,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, EngineError> {
        let category = request.category;
        let credential = category.credential_category();

        if snapshot.is_revoked(subject) {
            return Ok(VerificationOutcome::rejected(
                category,
                NotVerifiedReason::Revoked,
                "Credential has been revoked",
            ));
        }

        let Some(stored) = snapshot.commitment(credential, subject) else {
            return Ok(VerificationOutcome::rejected(
                category,
                NotVerifiedReason::NoCredential,
                format!(
                    "No {} credential found for this wallet",
                    credential.as_str()
                ),
            ));
        };

        if stored != request.commitment {
            return Ok(VerificationOutcome::rejected(
                category,
                NotVerifiedReason::CommitmentMismatch,
                "Commitment mismatch",
            ));
        }

        let Some(proof) = self.resolve_proof(subject, request).await? else {
            return Ok(VerificationOutcome::failed(
                category,
                NotVerifiedReason::NoProofAvailable,
                category.no_proof_reason(),
            ));
        };

        let stored_commitment = CommitmentHash::new(stored)
            .map_err(|e| EngineError::LedgerUnavailable(e.to_string()))?;
        let verdict = match self.verifiers.get(category).verify(&proof, &stored_commitment).await {
            Ok(verdict) => verdict,
            Err(VerifyError::MalformedProof(detail)) => {
                return Ok(VerificationOutcome::failed(
                    category,
                    NotVerifiedReason::ProofInvalid,
                    format!("Malformed proof: {detail}"),
                ));
            }
            Err(e @ VerifyError::Unavailable(_)) => return Err(e.into()),
        };

        if !verdict.valid {
            return Ok(VerificationOutcome::failed(
                category,
                NotVerifiedReason::ProofInvalid,
                verdict
                    .reason
                    .unwrap_or_else(|| "Proof verification failed".to_string()),
            ));
        }

        Ok(VerificationOutcome::verified(
            category,
            verdict.disclosed,
            stored.to_string(),
            snapshot
                .proof_reference(credential, subject)
                .map(str::to_string),
        ))
    }

    async fn resolve_proof(
        &self,
        subject: &SubjectKey,
        request: &VerificationRequest,
    ) -> Result<Option<PresentedProof>, EngineError> {
        if let Some(raw) = &request.proof {
            match PresentedProof::from_caller(raw) {
                Some(proof) => return Ok(Some(proof)),
                None => tracing::warn!(
                    category = %request.category,
                    "caller proof could not be read, falling back to the proof store"
                ),
            }
        }
        let key = ProofKey::for_category(subject, request.category);
        Ok(self.proofs.get(&key).await?.map(|stored| stored.proof))
    }
}

fn record(subject: &SubjectKey, outcome: &VerificationOutcome) {
    let code = outcome.reason.map_or("verified", |r| r.code());
    tracing::info!(
        subject = subject.short(),
        category = %outcome.category,
        outcome = code,
        "verification completed"
    );
    metrics::counter!(
        "kyc_verifications_total",
        "category" => outcome.category.as_str(),
        "outcome" => code
    )
    .increment(1);
}
