//! # kyc-store — Presented Proof Storage
//!
//! Proofs are submitted ahead of verification (by the holder's wallet or an
//! issuer) and looked up by the verification engine when the relying party
//! does not supply one. Entries are keyed by [`ProofKey`] and expire lazily.
//!
//! ## Backends
//!
//! - [`FileProofStore`] — one JSON document, atomic replace on write.
//! - [`MemoryProofStore`] — process-local, for development and tests.
//! - [`PgProofStore`] — PostgreSQL `kyc_proofs` table via SQLx.

pub mod error;
pub mod file;
pub mod key;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use file::FileProofStore;
pub use key::ProofKey;
pub use memory::MemoryProofStore;
pub use postgres::PgProofStore;
pub use store::{default_ttl, ProofStore, StoredProof, DEFAULT_TTL_DAYS};
