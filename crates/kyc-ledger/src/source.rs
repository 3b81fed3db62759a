//! # Ledger Boundary Traits
//!
//! The engine never talks to a chain directly. It reads contract state
//! through [`LedgerReader`] and submits state changes through
//! [`LedgerMutator`]. Transaction construction, proving and wallet signing
//! happen behind the mutator.

use async_trait::async_trait;

use crate::circuit::{LedgerMutation, MutationReceipt};
use crate::error::LedgerError;
use crate::fields::RawLedgerFields;
use crate::snapshot::CommitmentLedgerSnapshot;

/// Reads the current public state of the credential contract.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetch the raw contract fields.
    ///
    /// `Ok(None)` means the contract has no state yet (not deployed or never
    /// written). Transport and gateway failures are `Err`.
    async fn fetch_raw_fields(&self) -> Result<Option<RawLedgerFields>, LedgerError>;
}

/// Submits circuit calls that overwrite ledger fields.
#[async_trait]
pub trait LedgerMutator: Send + Sync {
    /// Submit a mutation and wait for finalization.
    ///
    /// Implementations return [`LedgerError::TransactionFailed`] when the
    /// mutation finalizes with any status other than `SucceedEntirely`.
    async fn submit_update(&self, mutation: LedgerMutation) -> Result<MutationReceipt, LedgerError>;
}

/// Read a fresh snapshot. `Ok(None)` if the contract has no state.
pub async fn read_snapshot(
    reader: &dyn LedgerReader,
) -> Result<Option<CommitmentLedgerSnapshot>, LedgerError> {
    let raw = reader.fetch_raw_fields().await?;
    Ok(raw.as_ref().map(CommitmentLedgerSnapshot::from_raw))
}

/// Read a snapshot, degrading to an empty one on any failure.
///
/// Used where stale-or-missing data is acceptable: credential status views
/// and the merge step of issuance.
pub async fn read_snapshot_or_empty(reader: &dyn LedgerReader) -> CommitmentLedgerSnapshot {
    match read_snapshot(reader).await {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => CommitmentLedgerSnapshot::empty(),
        Err(e) => {
            tracing::warn!(error = %e, "ledger snapshot unavailable, continuing with empty state");
            CommitmentLedgerSnapshot::empty()
        }
    }
}
