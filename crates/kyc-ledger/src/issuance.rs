//! # Commitment Issuance Coordination
//!
//! The contract stores each category's maps as whole JSON documents and its
//! circuits overwrite those documents wholesale. Issuing a credential is
//! therefore a read-modify-write: read the latest snapshot, clone the
//! category's maps, set the subject's entry, serialize, submit.
//!
//! ## Concurrency
//!
//! Two issuances for the same circuit that both read before either write
//! lose one entry; the second write wins. [`CommitmentIssuanceCoordinator::issue`]
//! and [`CommitmentIssuanceCoordinator::revoke`] hold a per-circuit async
//! mutex from the snapshot read until the mutation is acknowledged, which
//! closes the window inside one process. Separate processes writing the same
//! contract can still race; the `prepare_*` methods take no lock at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use kyc_core::{
    derive_subject_key, generate_credential_hash, CommitmentHash, CoreError, CredentialCategory,
    SubjectKey,
};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::circuit::{Circuit, LedgerMutation, MutationReceipt, SecurityParams};
use crate::codec::{serialize_map, LedgerMap};
use crate::error::LedgerError;
use crate::fields::{category_fields, LedgerField};
use crate::snapshot::CommitmentLedgerSnapshot;
use crate::source::{read_snapshot_or_empty, LedgerMutator, LedgerReader};

/// Marker written to `revokedSubjects`.
pub const REVOKED_MARKER: &str = "revoked";

/// Errors from issuance and revocation.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A request to put a commitment on the ledger.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    pub category: CredentialCategory,
    pub subject: SubjectKey,
    pub commitment: CommitmentHash,
    /// Opaque proof reference. Defaults to the commitment itself.
    pub proof_reference: Option<String>,
    /// Identifier of the issuing party.
    pub issuer: String,
}

/// A request to revoke a subject.
#[derive(Debug, Clone)]
pub struct RevocationRequest {
    pub subject: SubjectKey,
    pub reason: String,
    pub issuer: String,
    /// Credential being revoked. Defaults to the subject key.
    pub credential_id: Option<String>,
}

/// A fully-built mutation plus the decoded maps it will write.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedIssuance {
    pub mutation: LedgerMutation,
    /// New map contents, in circuit argument order.
    pub updated: Vec<(LedgerField, LedgerMap)>,
    /// Commitment written (or, for revocation, derived).
    pub commitment: CommitmentHash,
    pub proof_reference: Option<String>,
}

/// Outcome of a submitted issuance or revocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceReceipt {
    pub circuit: Circuit,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    pub status: String,
    pub commitment: CommitmentHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_reference: Option<String>,
}

/// Build the next version of a category's maps from a snapshot.
///
/// Pure; performs no I/O and takes no lock.
pub fn prepare_issuance_from(
    snapshot: &CommitmentLedgerSnapshot,
    request: &IssuanceRequest,
) -> Result<PreparedIssuance, CoreError> {
    let issuer_key = derive_subject_key(&request.issuer)?;
    let circuit = Circuit::for_category(request.category);
    let fields = category_fields(request.category);
    let subject = request.subject.as_str().to_string();
    let proof_reference = request
        .proof_reference
        .clone()
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| request.commitment.as_str().to_string());

    let mut commitments = snapshot.map(fields.commitments);
    commitments.insert(subject.clone(), request.commitment.as_str().to_string());
    let mut proof_refs = snapshot.map(fields.proof_refs);
    proof_refs.insert(subject.clone(), proof_reference.clone());
    let mut issuers = snapshot.map(fields.issuers);
    issuers.insert(subject, request.issuer.clone());

    let updated = vec![
        (fields.commitments, commitments),
        (fields.proof_refs, proof_refs),
        (fields.issuers, issuers),
    ];
    Ok(PreparedIssuance {
        mutation: LedgerMutation {
            circuit,
            arguments: updated.iter().map(|(_, m)| serialize_map(m)).collect(),
            security: SecurityParams::for_issuance(circuit, &issuer_key, &request.subject),
        },
        updated,
        commitment: request.commitment.clone(),
        proof_reference: Some(proof_reference),
    })
}

/// Build the revocation mutation from a snapshot.
pub fn prepare_revocation_from(
    snapshot: &CommitmentLedgerSnapshot,
    request: &RevocationRequest,
) -> Result<PreparedIssuance, CoreError> {
    let issuer_key = derive_subject_key(&request.issuer)?;
    let subject = request.subject.as_str().to_string();
    let credential_id = request
        .credential_id
        .clone()
        .unwrap_or_else(|| subject.clone());

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct RevocationClaim<'a> {
        credential_id: &'a str,
        reason: &'a str,
        issuer_reference: &'a str,
    }
    let commitment = generate_credential_hash(&RevocationClaim {
        credential_id: &credential_id,
        reason: &request.reason,
        issuer_reference: &request.issuer,
    })?;

    let mut reasons = snapshot.map(LedgerField::RevocationReasons);
    reasons.insert(subject.clone(), request.reason.clone());
    let mut issuers = snapshot.map(LedgerField::RevocationIssuers);
    issuers.insert(subject.clone(), request.issuer.clone());
    let mut revoked = snapshot.map(LedgerField::RevokedSubjects);
    revoked.insert(subject, REVOKED_MARKER.to_string());

    let updated = vec![
        (LedgerField::RevocationReasons, reasons),
        (LedgerField::RevocationIssuers, issuers),
        (LedgerField::RevokedSubjects, revoked),
    ];
    Ok(PreparedIssuance {
        mutation: LedgerMutation {
            circuit: Circuit::RevokeLastCredential,
            arguments: updated.iter().map(|(_, m)| serialize_map(m)).collect(),
            security: SecurityParams::for_revocation(&issuer_key, &request.subject),
        },
        updated,
        commitment,
        proof_reference: None,
    })
}

/// Reads the latest snapshot, merges one entry, and submits the result.
pub struct CommitmentIssuanceCoordinator {
    reader: Arc<dyn LedgerReader>,
    mutator: Arc<dyn LedgerMutator>,
    locks: BTreeMap<Circuit, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for CommitmentIssuanceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitmentIssuanceCoordinator")
            .field("circuits", &self.locks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CommitmentIssuanceCoordinator {
    pub fn new(reader: Arc<dyn LedgerReader>, mutator: Arc<dyn LedgerMutator>) -> Self {
        let locks = Circuit::ALL
            .iter()
            .map(|c| (*c, Arc::new(Mutex::new(()))))
            .collect();
        Self {
            reader,
            mutator,
            locks,
        }
    }

    /// Read the latest snapshot (best effort) and build the issuance.
    pub async fn prepare_issuance(
        &self,
        request: &IssuanceRequest,
    ) -> Result<PreparedIssuance, CoreError> {
        let snapshot = read_snapshot_or_empty(self.reader.as_ref()).await;
        prepare_issuance_from(&snapshot, request)
    }

    /// Read the latest snapshot (best effort) and build the revocation.
    pub async fn prepare_revocation(
        &self,
        request: &RevocationRequest,
    ) -> Result<PreparedIssuance, CoreError> {
        let snapshot = read_snapshot_or_empty(self.reader.as_ref()).await;
        prepare_revocation_from(&snapshot, request)
    }

    /// Issue a credential, serialized with other issuances of the same
    /// category.
    pub async fn issue(&self, request: &IssuanceRequest) -> Result<IssuanceReceipt, IssuanceError> {
        let circuit = Circuit::for_category(request.category);
        let _guard = self.lock(circuit).await;
        let prepared = self.prepare_issuance(request).await?;
        tracing::info!(
            circuit = %circuit,
            subject = request.subject.short(),
            "submitting credential issuance"
        );
        self.submit(prepared).await
    }

    /// Revoke a subject, serialized with other revocations.
    pub async fn revoke(&self, request: &RevocationRequest) -> Result<IssuanceReceipt, IssuanceError> {
        let _guard = self.lock(Circuit::RevokeLastCredential).await;
        let prepared = self.prepare_revocation(request).await?;
        tracing::info!(subject = request.subject.short(), "submitting revocation");
        self.submit(prepared).await
    }

    async fn lock(&self, circuit: Circuit) -> Option<tokio::sync::OwnedMutexGuard<()>> {
        match self.locks.get(&circuit) {
            Some(lock) => Some(lock.clone().lock_owned().await),
            None => None,
        }
    }

    async fn submit(&self, prepared: PreparedIssuance) -> Result<IssuanceReceipt, IssuanceError> {
        let circuit = prepared.mutation.circuit;
        let result = self.mutator.submit_update(prepared.mutation).await;
        let outcome = if result.as_ref().is_ok_and(MutationReceipt::succeeded) {
            "success"
        } else {
            "failure"
        };
        metrics::counter!("kyc_issuances_total", "circuit" => circuit.as_str(), "outcome" => outcome)
            .increment(1);

        let receipt = result?;
        if !receipt.succeeded() {
            tracing::warn!(circuit = %circuit, status = %receipt.status, "mutation did not finalize");
            return Err(LedgerError::TransactionFailed {
                circuit: circuit.as_str().to_string(),
                transaction_id: receipt.transaction_id,
                status: receipt.status,
            }
            .into());
        }
        tracing::info!(
            circuit = %circuit,
            transaction_id = %receipt.transaction_id,
            "mutation finalized"
        );
        Ok(IssuanceReceipt {
            circuit,
            transaction_id: receipt.transaction_id,
            block_height: receipt.block_height,
            status: receipt.status,
            commitment: prepared.commitment,
            proof_reference: prepared.proof_reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_field_str;

    fn request(holder: &str, category: CredentialCategory, commitment: &str) -> IssuanceRequest {
        IssuanceRequest {
            category,
            subject: derive_subject_key(holder).unwrap(),
            commitment: CommitmentHash::new(commitment).unwrap(),
            proof_reference: Some(format!("ref-{commitment}")),
            issuer: "issuer-wallet".into(),
        }
    }

    #[test]
    fn issuance_merges_into_existing_map() {
        let existing = derive_subject_key("bob").unwrap();
        let mut map = LedgerMap::new();
        map.insert(existing.as_str().into(), "0xbob".into());
        let snap = CommitmentLedgerSnapshot::from_maps([(LedgerField::AgeCommitments, map)]);

        let req = request("alice", CredentialCategory::Age, "0xalice");
        let prepared = prepare_issuance_from(&snap, &req).unwrap();
        assert_eq!(prepared.mutation.circuit, Circuit::IssueAgeCredential);
        assert_eq!(prepared.mutation.arguments.len(), 3);

        let commitments = parse_field_str(&prepared.mutation.arguments[0]);
        assert_eq!(commitments.len(), 2);
        assert_eq!(commitments[existing.as_str()], "0xbob");
        assert_eq!(commitments[req.subject.as_str()], "0xalice");

        let refs = parse_field_str(&prepared.mutation.arguments[1]);
        assert_eq!(refs[req.subject.as_str()], "ref-0xalice");
        let issuers = parse_field_str(&prepared.mutation.arguments[2]);
        assert_eq!(issuers[req.subject.as_str()], "issuer-wallet");
    }

    #[test]
    fn reissuance_overwrites_entry() {
        let req = request("alice", CredentialCategory::Human, "0x01");
        let first = prepare_issuance_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        let snap = CommitmentLedgerSnapshot::from_maps(first.updated.clone());
        let second =
            prepare_issuance_from(&snap, &request("alice", CredentialCategory::Human, "0x02")).unwrap();
        let commitments = parse_field_str(&second.mutation.arguments[0]);
        assert_eq!(commitments.len(), 1);
        assert_eq!(commitments[req.subject.as_str()], "0x02");
    }

    #[test]
    fn identity_reference_defaults_to_commitment() {
        let mut req = request("alice", CredentialCategory::Identity, "0xid");
        req.proof_reference = None;
        let prepared = prepare_issuance_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        assert_eq!(prepared.updated[1].0, LedgerField::IdentityMetadata);
        assert_eq!(prepared.updated[1].1[req.subject.as_str()], "0xid");
        assert_eq!(prepared.mutation.circuit, Circuit::RegisterIdentity);
    }

    #[test]
    fn security_params_carry_issuer_key() {
        let req = request("alice", CredentialCategory::Country, "0xfr");
        let prepared = prepare_issuance_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        let issuer_key = derive_subject_key("issuer-wallet").unwrap();
        assert_eq!(prepared.mutation.security.issuer_public_key, issuer_key.to_bytes32());
        assert!(prepared.mutation.security.subject_key.is_none());
    }

    #[test]
    fn age_issuance_carries_subject_key() {
        let req = request("alice", CredentialCategory::Age, "0xadult");
        let prepared = prepare_issuance_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        assert_eq!(
            prepared.mutation.security.subject_key,
            Some(req.subject.to_bytes32())
        );
    }

    #[test]
    fn blank_issuer_rejected() {
        let mut req = request("alice", CredentialCategory::Age, "0x01");
        req.issuer = "  ".into();
        assert!(prepare_issuance_from(&CommitmentLedgerSnapshot::empty(), &req).is_err());
    }

    #[test]
    fn revocation_writes_all_three_maps() {
        let subject = derive_subject_key("alice").unwrap();
        let req = RevocationRequest {
            subject: subject.clone(),
            reason: "fraud".into(),
            issuer: "issuer-wallet".into(),
            credential_id: Some("age-0x01".into()),
        };
        let prepared = prepare_revocation_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        assert_eq!(prepared.mutation.circuit, Circuit::RevokeLastCredential);
        assert_eq!(parse_field_str(&prepared.mutation.arguments[0])[subject.as_str()], "fraud");
        assert_eq!(
            parse_field_str(&prepared.mutation.arguments[1])[subject.as_str()],
            "issuer-wallet"
        );
        assert_eq!(
            parse_field_str(&prepared.mutation.arguments[2])[subject.as_str()],
            REVOKED_MARKER
        );
        assert_eq!(
            prepared.mutation.security.subject_key,
            Some(subject.to_bytes32())
        );
        assert!(prepared.commitment.as_str().starts_with("0x"));
    }

    #[test]
    fn revocation_commitment_is_deterministic() {
        let req = RevocationRequest {
            subject: derive_subject_key("alice").unwrap(),
            reason: "expired documents".into(),
            issuer: "issuer-wallet".into(),
            credential_id: None,
        };
        let a = prepare_revocation_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        let b = prepare_revocation_from(&CommitmentLedgerSnapshot::empty(), &req).unwrap();
        assert_eq!(a.commitment, b.commitment);
    }
}
