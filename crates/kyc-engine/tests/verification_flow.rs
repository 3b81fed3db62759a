//! End-to-end verification against the in-memory ledger, the in-memory proof
//! store and the mock verifiers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use kyc_core::{derive_subject_key, CommitmentHash, CredentialCategory, ProofCategory, SubjectKey};
use kyc_engine::{
    EngineError, NotVerifiedReason, ProofVerificationEngine, VerificationOutcome,
    VerificationRequest,
};
use kyc_ledger::{
    CommitmentIssuanceCoordinator, InMemoryLedger, IssuanceRequest, LedgerField, LedgerHydrator,
    LedgerMap, RevocationRequest,
};
use kyc_store::{MemoryProofStore, ProofKey, ProofStore};
use kyc_zkp::{
    MockPredicateProver, PredicateVerifier, PresentedProof, VerifierRegistry, VerifierVerdict,
    VerifyError,
};
use serde_json::json;

const HOLDER: &str = "mn_addr_holder_01";
const ISSUER: &str = "did:example:issuer";

struct Fixture {
    ledger: InMemoryLedger,
    store: MemoryProofStore,
    engine: ProofVerificationEngine,
    coordinator: CommitmentIssuanceCoordinator,
}

fn fixture() -> Fixture {
    fixture_with(VerifierRegistry::mock())
}

fn fixture_with(verifiers: VerifierRegistry) -> Fixture {
    let ledger = InMemoryLedger::new();
    let store = MemoryProofStore::new();
    let engine = ProofVerificationEngine::new(
        Arc::new(ledger.clone()),
        Arc::new(store.clone()),
        verifiers,
    );
    let coordinator =
        CommitmentIssuanceCoordinator::new(Arc::new(ledger.clone()), Arc::new(ledger.clone()));
    Fixture {
        ledger,
        store,
        engine,
        coordinator,
    }
}

fn subject() -> SubjectKey {
    derive_subject_key(HOLDER).unwrap()
}

async fn issue(f: &Fixture, category: CredentialCategory, commitment: &str) {
    f.coordinator
        .issue(&IssuanceRequest {
            category,
            subject: subject(),
            commitment: CommitmentHash::new(commitment).unwrap(),
            proof_reference: Some(format!("ref-{commitment}")),
            issuer: ISSUER.to_string(),
        })
        .await
        .unwrap();
}

async fn store_proof(f: &Fixture, category: ProofCategory, commitment: &str, value: bool) {
    let proof = MockPredicateProver::new()
        .prove(category, &CommitmentHash::new(commitment).unwrap(), value)
        .unwrap();
    f.store
        .store(&ProofKey::for_category(&subject(), category), proof, Duration::days(1))
        .await
        .unwrap();
}

fn request(category: ProofCategory, commitment: &str) -> VerificationRequest {
    VerificationRequest {
        category,
        holder_identifier: HOLDER.to_string(),
        commitment: commitment.to_string(),
        proof: None,
    }
}

#[tokio::test]
async fn stored_proof_verifies_and_discloses() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let outcome = f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.disclosed, Some(true));
    assert_eq!(outcome.commitment.as_deref(), Some("0xage"));
    assert_eq!(outcome.proof_reference.as_deref(), Some("ref-0xage"));
}

#[tokio::test]
async fn missing_proof_reports_false_predicate() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;

    let outcome = f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({
            "verified": false,
            "isAdult": false,
            "reason": "No ZK proof available for verification. Age value cannot be read directly for privacy.",
            "reasonCode": "no_proof_available"
        })
    );
}

#[tokio::test]
async fn revocation_wins_over_a_valid_proof() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;
    f.coordinator
        .revoke(&RevocationRequest {
            subject: subject(),
            reason: "fraud".into(),
            issuer: ISSUER.into(),
            credential_id: None,
        })
        .await
        .unwrap();

    let outcome = f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.reason, Some(NotVerifiedReason::Revoked));
    assert_eq!(outcome.disclosed, None);
}

#[tokio::test]
async fn commitment_mismatch_is_reported() {
    let f = fixture();
    issue(&f, CredentialCategory::Country, "0xcountry").await;
    store_proof(&f, ProofCategory::Country, "0xcountry", true).await;

    let outcome = f
        .engine
        .verify(&request(ProofCategory::Country, "0xsomething-else"))
        .await
        .unwrap();
    assert_eq!(outcome.reason, Some(NotVerifiedReason::CommitmentMismatch));
    assert_eq!(outcome.message.as_deref(), Some("Commitment mismatch"));
}

#[tokio::test]
async fn blank_ledger_commitment_is_no_credential() {
    let f = fixture();
    f.ledger.seed(
        LedgerField::AgeCommitments,
        &LedgerMap::from([(subject().as_str().to_string(), String::new())]),
    );
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let outcome = f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.reason, Some(NotVerifiedReason::NoCredential));
}

#[tokio::test]
async fn captcha_checks_the_human_credential() {
    let f = fixture();
    let outcome = f
        .engine
        .verify(&request(ProofCategory::Captcha, "0xh"))
        .await;
    // No state at all yet.
    assert!(matches!(outcome, Err(EngineError::LedgerUnavailable(_))));

    issue(&f, CredentialCategory::Age, "0xage").await;
    let outcome = f.engine.verify(&request(ProofCategory::Captcha, "0xh")).await.unwrap();
    assert_eq!(outcome.reason, Some(NotVerifiedReason::NoCredential));
    assert_eq!(
        outcome.message.as_deref(),
        Some("No human credential found for this wallet")
    );

    issue(&f, CredentialCategory::Human, "0xh").await;
    store_proof(&f, ProofCategory::Captcha, "0xh", true).await;
    let outcome = f.engine.verify(&request(ProofCategory::Captcha, "0xh")).await.unwrap();
    assert!(outcome.verified);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap()["captchaPassed"],
        json!(true)
    );
}

#[tokio::test]
async fn caller_proof_takes_precedence_over_stored() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let minor = MockPredicateProver::new()
        .prove(ProofCategory::Age, &CommitmentHash::new("0xage").unwrap(), false)
        .unwrap();
    let mut req = request(ProofCategory::Age, "0xage");
    req.proof = Some(serde_json::Value::String(
        serde_json::to_string(&minor).unwrap(),
    ));

    let outcome = f.engine.verify(&req).await.unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.disclosed, Some(false));
}

#[tokio::test]
async fn unreadable_caller_proof_falls_back_to_store() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let mut req = request(ProofCategory::Age, "0xage");
    req.proof = Some(json!("{definitely not json"));
    let outcome = f.engine.verify(&req).await.unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.disclosed, Some(true));
}

#[tokio::test]
async fn forged_proof_is_invalid() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;

    let mut req = request(ProofCategory::Age, "0xage");
    req.proof = Some(json!({
        "commitment": "0xage",
        "proof": "00".repeat(32),
        "statement": {"predicate": "isAdult", "value": true}
    }));
    let outcome = f.engine.verify(&req).await.unwrap();
    assert!(!outcome.verified);
    assert_eq!(outcome.reason, Some(NotVerifiedReason::ProofInvalid));
    assert_eq!(outcome.disclosed, Some(false));
}

#[tokio::test]
async fn malformed_proof_bytes_count_as_invalid() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;

    let mut req = request(ProofCategory::Age, "0xage");
    req.proof = Some(json!({
        "commitment": "0xage",
        "proof": "not-hex",
        "statement": {"predicate": "isAdult", "value": true}
    }));
    let outcome = f.engine.verify(&req).await.unwrap();
    assert_eq!(outcome.reason, Some(NotVerifiedReason::ProofInvalid));
}

#[tokio::test]
async fn ledger_outage_is_an_error() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    f.ledger.set_unavailable(Some("gateway timeout"));
    let err = f
        .engine
        .verify(&request(ProofCategory::Age, "0xage"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::LedgerUnavailable(_)));
}

#[tokio::test]
async fn blank_holder_is_rejected() {
    let f = fixture();
    let mut req = request(ProofCategory::Age, "0xage");
    req.holder_identifier = "   ".into();
    assert!(matches!(
        f.engine.verify(&req).await,
        Err(EngineError::InvalidIdentifier(_))
    ));
}

struct DownVerifier(ProofCategory);

#[async_trait]
impl PredicateVerifier for DownVerifier {
    fn category(&self) -> ProofCategory {
        self.0
    }

    async fn verify(
        &self,
        _proof: &PresentedProof,
        _commitment: &CommitmentHash,
    ) -> Result<VerifierVerdict, VerifyError> {
        Err(VerifyError::Unavailable("proof server unreachable".into()))
    }
}

#[tokio::test]
async fn verifier_outage_propagates() {
    let registry = VerifierRegistry::new(
        Arc::new(DownVerifier(ProofCategory::Age)),
        Arc::new(DownVerifier(ProofCategory::Country)),
        Arc::new(DownVerifier(ProofCategory::Captcha)),
    );
    let f = fixture_with(registry);
    issue(&f, CredentialCategory::Age, "0xage").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let err = f
        .engine
        .verify(&request(ProofCategory::Age, "0xage"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Verifier(VerifyError::Unavailable(_))));
}

#[tokio::test]
async fn disclosure_reaches_only_the_matching_record() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;
    issue(&f, CredentialCategory::Human, "0xh").await;
    store_proof(&f, ProofCategory::Age, "0xage", true).await;

    let outcome: VerificationOutcome =
        f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();

    let snapshot = kyc_ledger::read_snapshot(&f.ledger).await.unwrap().unwrap();
    let mut hydrated = LedgerHydrator::new().hydrate(&snapshot, Some(HOLDER));
    let mut attached = 0;
    for record in &mut hydrated.credentials {
        if outcome.disclose_into(record) {
            attached += 1;
            assert_eq!(record.metadata["isAdult"], json!(true));
        } else {
            assert!(!record.metadata.contains_key("isAdult"));
        }
    }
    assert_eq!(attached, 1);
}

#[tokio::test]
async fn failed_outcome_discloses_nothing() {
    let f = fixture();
    issue(&f, CredentialCategory::Age, "0xage").await;

    let outcome = f.engine.verify(&request(ProofCategory::Age, "0xage")).await.unwrap();
    assert_eq!(outcome.disclosed, Some(false));

    let snapshot = kyc_ledger::read_snapshot(&f.ledger).await.unwrap().unwrap();
    let mut hydrated = LedgerHydrator::new().hydrate(&snapshot, Some(HOLDER));
    assert!(!outcome.disclose_into(&mut hydrated.credentials[0]));
    assert!(!hydrated.credentials[0].metadata.contains_key("isAdult"));
}
