//! # API Route Modules
//!
//! - `kyc` — public verification and credential status.
//! - `proofs` — authenticated proof storage and administration.
//! - `issuance` — authenticated commitment issuance and revocation.

pub mod issuance;
pub mod kyc;
pub mod proofs;
