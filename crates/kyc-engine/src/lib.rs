//! # kyc-engine — Proof Verification and Credential Status
//!
//! Composes the ledger, the proof store and the verifier registry into the
//! two read paths relying parties and holders use:
//!
//! - [`ProofVerificationEngine`] — verify a predicate for a holder and
//!   return only the disclosed boolean.
//! - [`CredentialStatusService`] — list a holder's on-ledger credentials
//!   with every proven predicate redacted.

pub mod error;
pub mod outcome;
pub mod status;
pub mod verify;

pub use error::EngineError;
pub use outcome::{NotVerifiedReason, VerificationOutcome};
pub use status::{CredentialStatusService, CredentialStatusView};
pub use verify::{resolve_category, ProofVerificationEngine, VerificationRequest};
