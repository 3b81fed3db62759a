//! # Mock Predicate Prover and Verifier
//!
//! A deterministic, transparent stand-in for the real proof system, for
//! development and tests.
//!
//! ```text
//! statement = { "predicate": <isAdult|isFrance|captchaPassed>, "value": <bool> }
//! proof     = hex( SHA256( JCS({ "domain": vk.domain, "commitment": c, "statement": statement }) ) )
//! ```
//!
//! ## Security Warning
//!
//! **NOT ZERO-KNOWLEDGE.** Anyone who knows the commitment can produce a
//! "proof" for any statement. Never configure the mock in a deployment that
//! relies on proofs for access decisions.

use std::sync::Arc;

use async_trait::async_trait;
use kyc_core::{sha256_hex, CanonicalBytes, CommitmentHash, ProofCategory};
use serde_json::{json, Value};

use crate::cache::VerifyingKeyCache;
use crate::proof::PresentedProof;
use crate::traits::{PredicateVerifier, ProofError, VerifierVerdict, VerifyError};

const DOMAIN_PREFIX: &str = "kyc-mock-predicate-v1";

/// Verifying key for the mock system: a per-category domain tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockVerifyingKey {
    pub domain: String,
}

impl MockVerifyingKey {
    pub fn for_category(category: ProofCategory) -> Self {
        Self {
            domain: format!("{DOMAIN_PREFIX}:{}", category.as_str()),
        }
    }
}

fn proof_digest(
    key: &MockVerifyingKey,
    commitment: &str,
    statement: &Value,
) -> Result<String, String> {
    let canonical = CanonicalBytes::new(&json!({
        "domain": key.domain,
        "commitment": commitment,
        "statement": statement,
    }))
    .map_err(|e| e.to_string())?;
    Ok(sha256_hex(&canonical))
}

/// Produces mock proofs for any category.
#[derive(Debug, Clone, Default)]
pub struct MockPredicateProver;

impl MockPredicateProver {
    pub fn new() -> Self {
        Self
    }

    /// Prove that the holder bound to `commitment` has `value` for the
    /// category's predicate.
    pub fn prove(
        &self,
        category: ProofCategory,
        commitment: &CommitmentHash,
        value: bool,
    ) -> Result<PresentedProof, ProofError> {
        let statement = json!({ "predicate": category.predicate_name(), "value": value });
        let key = MockVerifyingKey::for_category(category);
        let proof = proof_digest(&key, commitment.as_str(), &statement)
            .map_err(ProofError::GenerationFailed)?;
        Ok(PresentedProof {
            commitment: commitment.as_str().to_string(),
            proof: Value::String(proof),
            statement,
            public_inputs: Some(json!([commitment.as_str()])),
            created_at: None,
        })
    }
}

/// Verifies mock proofs for one category.
#[derive(Debug, Clone)]
pub struct MockPredicateVerifier {
    category: ProofCategory,
    keys: Arc<VerifyingKeyCache<MockVerifyingKey>>,
}

impl MockPredicateVerifier {
    pub fn new(category: ProofCategory, keys: Arc<VerifyingKeyCache<MockVerifyingKey>>) -> Self {
        Self { category, keys }
    }
}

#[async_trait]
impl PredicateVerifier for MockPredicateVerifier {
    fn category(&self) -> ProofCategory {
        self.category
    }

    async fn verify(
        &self,
        proof: &PresentedProof,
        commitment: &CommitmentHash,
    ) -> Result<VerifierVerdict, VerifyError> {
        let key = self
            .keys
            .get_or_load(self.category, || Ok(MockVerifyingKey::for_category(self.category)))?;

        let proof_hex = proof
            .proof
            .as_str()
            .ok_or_else(|| VerifyError::MalformedProof("proof must be a hex string".into()))?;
        if proof_hex.len() != 64 || !proof_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerifyError::MalformedProof(format!(
                "expected 64 hex characters, got {}",
                proof_hex.len()
            )));
        }

        let predicate = proof.statement.get("predicate").and_then(Value::as_str);
        if predicate != Some(self.category.predicate_name()) {
            return Ok(VerifierVerdict::invalid(format!(
                "Statement does not prove {}",
                self.category.predicate_name()
            )));
        }
        let disclosed = proof
            .statement
            .get("value")
            .and_then(Value::as_bool)
            .ok_or_else(|| VerifyError::MalformedProof("statement value must be boolean".into()))?;

        if !commitment.matches(&proof.commitment) {
            return Ok(VerifierVerdict::invalid(
                "Proof is bound to a different commitment",
            ));
        }

        let expected = proof_digest(&key, commitment.as_str(), &proof.statement)
            .map_err(VerifyError::MalformedProof)?;
        if !expected.eq_ignore_ascii_case(proof_hex) {
            return Ok(VerifierVerdict::invalid("Proof verification failed"));
        }
        Ok(VerifierVerdict::valid(disclosed))
    }
}
