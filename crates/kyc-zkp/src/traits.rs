//! # Predicate Verifier Trait
//!
//! The verifier is an external capability: given a presented proof and the
//! commitment stored on the ledger, it answers whether the proof is valid
//! and which boolean it discloses. Circuit internals, setup and proving
//! algorithms live behind this trait.
//!
//! Unlike a proof backend compiled into the binary, verifiers are supplied
//! by the deployment (a remote proof server, a wasm verifier, the mock), so
//! the trait is open to implementation outside this crate.

use async_trait::async_trait;
use kyc_core::{CommitmentHash, ProofCategory};
use thiserror::Error;

use crate::proof::PresentedProof;

/// Error during proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The inputs are invalid or missing.
    #[error("invalid prover inputs: {0}")]
    InvalidInputs(String),
    /// Proof generation failed internally.
    #[error("proof generation failed: {0}")]
    GenerationFailed(String),
}

/// Error during proof verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof is structurally malformed. Counts as an invalid proof.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// The verifier could not be reached or could not load its key.
    /// Propagates to the caller as an infrastructure failure.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

/// What a verifier concluded about a well-formed proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierVerdict {
    pub valid: bool,
    /// The disclosed predicate. Meaningful only when `valid`.
    pub disclosed: bool,
    pub reason: Option<String>,
}

impl VerifierVerdict {
    pub fn valid(disclosed: bool) -> Self {
        Self {
            valid: true,
            disclosed,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            disclosed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Verifies proofs for one predicate.
#[async_trait]
pub trait PredicateVerifier: Send + Sync {
    /// The predicate this verifier handles.
    fn category(&self) -> ProofCategory;

    /// Verify `proof` against the commitment stored on the ledger.
    ///
    /// # Errors
    ///
    /// [`VerifyError::MalformedProof`] if the proof cannot be decoded,
    /// [`VerifyError::Unavailable`] if verification could not run.
    async fn verify(
        &self,
        proof: &PresentedProof,
        commitment: &CommitmentHash,
    ) -> Result<VerifierVerdict, VerifyError>;
}
