//! # kyc-zkp — Predicate Proof Boundary
//!
//! Defines what the verification engine needs from a zero-knowledge proof
//! system without implementing one:
//!
//! - [`PresentedProof`] — the envelope holders submit and the store keeps.
//! - [`PredicateVerifier`] — verifies a proof against a stored commitment
//!   and returns only the disclosed boolean.
//! - [`VerifierRegistry`] — one verifier per proof category.
//! - [`VerifyingKeyCache`] — injected, populate-on-first-use key cache.
//!
//! The [`mock`] module provides a transparent SHA-256 prover and verifier.
//! It is **not** zero-knowledge and exists for development and tests.

pub mod cache;
pub mod mock;
pub mod proof;
pub mod registry;
pub mod traits;

pub use cache::VerifyingKeyCache;
pub use mock::{MockPredicateProver, MockPredicateVerifier, MockVerifyingKey};
pub use proof::{PresentedProof, ProofEnvelopeError};
pub use registry::VerifierRegistry;
pub use traits::{PredicateVerifier, ProofError, VerifierVerdict, VerifyError};
