//! # kyc-ledger — Commitment Ledger Access
//!
//! Everything between the credential contract's public state and the rest
//! of the workspace:
//!
//! - [`codec`] decodes and encodes the JSON maps stored in each field.
//! - [`snapshot`] is an immutable decoded view of one read.
//! - [`hydrate`] projects a snapshot onto one holder.
//! - [`issuance`] builds and submits the next version of a field.
//! - [`source`] defines the read and mutation boundaries;
//!   [`http`] and [`memory`] implement them.
//!
//! No holder identifier is persisted or logged by this crate. Subject keys
//! are logged truncated.

pub mod circuit;
pub mod codec;
pub mod config;
pub mod error;
pub mod fields;
pub mod http;
pub mod hydrate;
pub mod issuance;
pub mod memory;
pub(crate) mod retry;
pub mod snapshot;
pub mod source;

pub use circuit::{Circuit, LedgerMutation, MutationReceipt, SecurityParams};
pub use codec::{parse_field, parse_field_str, serialize_map, LedgerMap};
pub use config::LedgerClientConfig;
pub use error::LedgerError;
pub use fields::{category_fields, LedgerField, RawLedgerFields};
pub use http::HttpLedgerClient;
pub use hydrate::{
    CredentialRecord, CredentialStatus, HydratedLedger, KycStatus, LedgerHydrator,
    PredicateDisclosure,
};
pub use issuance::{
    CommitmentIssuanceCoordinator, IssuanceError, IssuanceReceipt, IssuanceRequest,
    PreparedIssuance, RevocationRequest,
};
pub use memory::InMemoryLedger;
pub use snapshot::CommitmentLedgerSnapshot;
pub use source::{read_snapshot, read_snapshot_or_empty, LedgerMutator, LedgerReader};
