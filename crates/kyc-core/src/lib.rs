//! # kyc-core — Foundational Types for the KYC Commitment Ledger
//!
//! This crate defines the primitives every other crate in the workspace
//! builds on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Pseudonymous subject keys.** A holder's wallet identifier never
//!    leaves the request boundary. Everything that touches the ledger or the
//!    proof store is indexed by [`SubjectKey`], a one-way SHA-256 derivation
//!    of the normalized identifier.
//!
//! 2. **Closed category enums.** [`CredentialCategory`] and
//!    [`ProofCategory`] are exhaustive. Unknown proof types are rejected at
//!    parse time with [`CoreError::UnsupportedProofType`]; there is no
//!    string-keyed dispatch anywhere downstream.
//!
//! 3. **`CanonicalBytes` newtype.** Credential hashes flow through
//!    `CanonicalBytes::new()` (JCS, RFC 8785), so the same credential data
//!    always produces the same commitment.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] enforces UTC with `Z` suffix
//!    and seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `kyc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod category;
pub mod commitment;
pub mod digest;
pub mod error;
pub mod subject;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use category::{CredentialCategory, ProofCategory};
pub use commitment::{generate_credential_hash, CommitmentHash};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CoreError};
pub use subject::{derive_subject_key, SubjectKey};
pub use temporal::Timestamp;
