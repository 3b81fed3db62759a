//! # Verification Outcomes
//!
//! What a relying party learns from a verification: whether the proof
//! verified and the single disclosed predicate. The serialized form names
//! the predicate after the category (`isAdult`, `isFrance`,
//! `captchaPassed`):
//!
//! ```text
//! { "verified": true,  "isAdult": true, "commitment": "0x…", "proofReference": "…" }
//! { "verified": false, "isAdult": false, "reason": "…", "reasonCode": "no_proof_available" }
//! { "verified": false, "reason": "Credential has been revoked", "reasonCode": "revoked" }
//! ```
//!
//! ## Security Invariant
//!
//! An outcome never carries the private attribute, only the predicate the
//! verifier disclosed.

use kyc_core::ProofCategory;
use kyc_ledger::{CredentialRecord, PredicateDisclosure};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Why a verification did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotVerifiedReason {
    Revoked,
    NoCredential,
    CommitmentMismatch,
    NoProofAvailable,
    ProofInvalid,
}

impl NotVerifiedReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Revoked => "revoked",
            Self::NoCredential => "no_credential",
            Self::CommitmentMismatch => "commitment_mismatch",
            Self::NoProofAvailable => "no_proof_available",
            Self::ProofInvalid => "proof_invalid",
        }
    }
}

impl std::fmt::Display for NotVerifiedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of one verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub category: ProofCategory,
    pub verified: bool,
    /// The disclosed predicate. `None` when the request was rejected before
    /// a proof was considered.
    pub disclosed: Option<bool>,
    pub reason: Option<NotVerifiedReason>,
    /// Human-readable explanation accompanying `reason`.
    pub message: Option<String>,
    pub commitment: Option<String>,
    pub proof_reference: Option<String>,
}

impl VerificationOutcome {
    pub fn verified(
        category: ProofCategory,
        disclosed: bool,
        commitment: String,
        proof_reference: Option<String>,
    ) -> Self {
        Self {
            category,
            verified: true,
            disclosed: Some(disclosed),
            reason: None,
            message: None,
            commitment: Some(commitment),
            proof_reference,
        }
    }

    /// Rejected before any proof was examined; no predicate is reported.
    pub fn rejected(
        category: ProofCategory,
        reason: NotVerifiedReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            verified: false,
            disclosed: None,
            reason: Some(reason),
            message: Some(message.into()),
            commitment: None,
            proof_reference: None,
        }
    }

    /// A proof was missing or failed; the predicate is reported as `false`.
    pub fn failed(
        category: ProofCategory,
        reason: NotVerifiedReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            disclosed: Some(false),
            ..Self::rejected(category, reason, message)
        }
    }

    /// The predicate key this outcome serializes under.
    pub fn predicate_name(&self) -> &'static str {
        self.category.predicate_name()
    }

    /// Copy a verified predicate onto the matching credential record.
    ///
    /// Only a verified outcome discloses anything; returns whether the
    /// record was updated.
    pub fn disclose_into(&self, record: &mut CredentialRecord) -> bool {
        record.attach_disclosure(self)
    }
}

impl PredicateDisclosure for VerificationOutcome {
    fn proof_category(&self) -> ProofCategory {
        self.category
    }

    fn verified_predicate(&self) -> Option<bool> {
        if self.verified {
            self.disclosed
        } else {
            None
        }
    }
}

impl Serialize for VerificationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("verified", &self.verified)?;
        if let Some(disclosed) = self.disclosed {
            map.serialize_entry(self.predicate_name(), &disclosed)?;
        }
        if let Some(message) = &self.message {
            map.serialize_entry("reason", message)?;
        }
        if let Some(reason) = self.reason {
            map.serialize_entry("reasonCode", reason.code())?;
        }
        if let Some(commitment) = &self.commitment {
            map.serialize_entry("commitment", commitment)?;
        }
        if let Some(reference) = &self.proof_reference {
            map.serialize_entry("proofReference", reference)?;
        }
        map.end()
    }
}
