//! # Ledger Hydration
//!
//! Projects a [`CommitmentLedgerSnapshot`] onto one holder: a headline KYC
//! summary plus one [`CredentialRecord`] per category that has a live
//! commitment.
//!
//! ## Security Invariant
//!
//! The ledger stores commitments, never attribute values. Hydration never
//! writes a zero-knowledge-proven predicate (`isAdult`, `isFrance`,
//! `captchaPassed`, `overAge`) into record metadata. The only path for a
//! predicate into metadata is [`CredentialRecord::attach_disclosure`], which
//! takes a [`PredicateDisclosure`] and writes nothing unless the proof
//! verified.

use std::collections::BTreeMap;

use chrono::Duration;
use kyc_core::{derive_subject_key, CredentialCategory, ProofCategory, SubjectKey, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::snapshot::CommitmentLedgerSnapshot;

/// Metadata keys that may only carry a value disclosed by a verified proof.
pub const PRIVATE_PREDICATE_KEYS: [&str; 4] = ["isAdult", "isFrance", "captchaPassed", "overAge"];

/// Validity window applied to hydrated records.
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// A verification result that may disclose one predicate.
pub trait PredicateDisclosure {
    fn proof_category(&self) -> ProofCategory;

    /// The proven predicate value. `None` unless the proof verified.
    fn verified_predicate(&self) -> Option<bool>;
}

/// Lifecycle status of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialStatus {
    Verified,
    Pending,
    Revoked,
    Expired,
    None,
}

/// Headline KYC summary. Country credentials produce a record but no
/// summary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycStatus {
    pub identity: CredentialStatus,
    pub human: CredentialStatus,
    pub age: CredentialStatus,
}

impl Default for KycStatus {
    fn default() -> Self {
        Self {
            identity: CredentialStatus::None,
            human: CredentialStatus::None,
            age: CredentialStatus::None,
        }
    }
}

impl KycStatus {
    fn set(&mut self, category: CredentialCategory, status: CredentialStatus) {
        match category {
            CredentialCategory::Identity => self.identity = status,
            CredentialCategory::Age => self.age = status,
            CredentialCategory::Human => self.human = status,
            CredentialCategory::Country => {}
        }
    }
}

/// Holder-facing projection of one on-ledger credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// `<category>-<commitment>`.
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub category: CredentialCategory,
    pub holder: String,
    pub issuer: String,
    pub status: CredentialStatus,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub commitment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zk_proof_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl CredentialRecord {
    /// Record the predicate disclosed by a successful verification.
    ///
    /// Returns `false` and leaves the record untouched if nothing was
    /// verified or the proof category does not belong to this record's
    /// credential category.
    pub fn attach_disclosure(&mut self, source: &impl PredicateDisclosure) -> bool {
        let Some(disclosed) = source.verified_predicate() else {
            return false;
        };
        let proof = source.proof_category();
        if proof.credential_category() != self.category {
            return false;
        }
        self.metadata
            .insert(proof.predicate_name().to_string(), Value::Bool(disclosed));
        true
    }

    /// Copy of the record with every predicate key removed from metadata.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.metadata
            .retain(|k, _| !PRIVATE_PREDICATE_KEYS.contains(&k.as_str()));
        copy
    }
}

/// Result of hydrating a snapshot for one holder.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedLedger {
    pub subject_key: Option<SubjectKey>,
    pub kyc_status: KycStatus,
    pub credentials: Vec<CredentialRecord>,
}

/// Builds KYC summaries and credential records from ledger snapshots.
#[derive(Debug, Clone)]
pub struct LedgerHydrator {
    validity: Duration,
}

impl Default for LedgerHydrator {
    fn default() -> Self {
        Self {
            validity: Duration::days(DEFAULT_VALIDITY_DAYS),
        }
    }
}

impl LedgerHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate for a holder at the current time. Never fails.
    pub fn hydrate(
        &self,
        snapshot: &CommitmentLedgerSnapshot,
        holder_identifier: Option<&str>,
    ) -> HydratedLedger {
        self.hydrate_at(snapshot, holder_identifier, Timestamp::now())
    }

    /// Hydrate with an explicit clock reading.
    pub fn hydrate_at(
        &self,
        snapshot: &CommitmentLedgerSnapshot,
        holder_identifier: Option<&str>,
        now: Timestamp,
    ) -> HydratedLedger {
        let Some(holder) = holder_identifier else {
            return HydratedLedger::default();
        };
        let Ok(subject_key) = derive_subject_key(holder) else {
            return HydratedLedger::default();
        };

        let revoked = snapshot.is_revoked(&subject_key);
        let revocation_reason = snapshot.revocation_reason(&subject_key).map(str::to_string);
        let status = if revoked {
            CredentialStatus::Revoked
        } else {
            CredentialStatus::Verified
        };
        let expires_at = now.plus(self.validity);

        let mut kyc_status = KycStatus::default();
        let mut credentials = Vec::new();

        for category in CredentialCategory::ALL {
            let Some(commitment) = snapshot.commitment(category, &subject_key) else {
                continue;
            };
            let proof_reference = snapshot
                .proof_reference(category, &subject_key)
                .map(str::to_string);
            let issuer = snapshot
                .issuer(category, &subject_key)
                .unwrap_or(holder)
                .to_string();

            let mut metadata = BTreeMap::new();
            if category == CredentialCategory::Age {
                metadata.insert("commitment".to_string(), Value::String(commitment.to_string()));
            }
            if let Some(reference) = &proof_reference {
                metadata.insert("proofReference".to_string(), Value::String(reference.clone()));
            }

            credentials.push(CredentialRecord {
                id: format!("{}-{commitment}", category.as_str()),
                credential_type: category.display_name().to_string(),
                category,
                holder: holder.to_string(),
                issuer,
                status,
                issued_at: now,
                expires_at,
                commitment: commitment.to_string(),
                proof_reference,
                zk_proof_summary: proof_summary(category).map(str::to_string),
                revocation_reason: if revoked { revocation_reason.clone() } else { None },
                metadata,
            });
            kyc_status.set(category, status);
        }

        tracing::debug!(
            subject = subject_key.short(),
            credentials = credentials.len(),
            revoked,
            "hydrated ledger snapshot"
        );

        HydratedLedger {
            subject_key: Some(subject_key),
            kyc_status,
            credentials,
        }
    }
}

fn proof_summary(category: CredentialCategory) -> Option<&'static str> {
    match category {
        CredentialCategory::Identity => None,
        CredentialCategory::Age => Some(
            "Age credential issued on-chain. ZK proof available for privacy-preserving verification.",
        ),
        CredentialCategory::Human => Some("On-chain proof confirms liveness verification"),
        CredentialCategory::Country => Some(
            "Country credential issued on-chain. ZK proof available for privacy-preserving verification.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::LedgerMap;
    use crate::fields::LedgerField;

    const WALLET: &str = "mn_addr_test1alice";

    struct Verdict {
        category: ProofCategory,
        verified: bool,
        value: bool,
    }

    impl PredicateDisclosure for Verdict {
        fn proof_category(&self) -> ProofCategory {
            self.category
        }

        fn verified_predicate(&self) -> Option<bool> {
            self.verified.then_some(self.value)
        }
    }

    fn verdict(category: ProofCategory, verified: bool) -> Verdict {
        Verdict {
            category,
            verified,
            value: true,
        }
    }

    fn snapshot_for(entries: &[(LedgerField, &str)]) -> CommitmentLedgerSnapshot {
        let key = derive_subject_key(WALLET).unwrap();
        CommitmentLedgerSnapshot::from_maps(entries.iter().map(|(field, value)| {
            let mut map = LedgerMap::new();
            map.insert(key.as_str().to_string(), value.to_string());
            (*field, map)
        }))
    }

    #[test]
    fn no_identifier_gives_defaults() {
        let snap = snapshot_for(&[(LedgerField::AgeCommitments, "c1")]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, None);
        assert_eq!(hydrated.kyc_status, KycStatus::default());
        assert!(hydrated.credentials.is_empty());
        assert!(hydrated.subject_key.is_none());
    }

    #[test]
    fn blank_identifier_gives_defaults() {
        let snap = snapshot_for(&[(LedgerField::AgeCommitments, "c1")]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some("   "));
        assert!(hydrated.credentials.is_empty());
    }

    #[test]
    fn empty_snapshot_gives_defaults_with_subject_key() {
        let hydrated = LedgerHydrator::new().hydrate(&CommitmentLedgerSnapshot::empty(), Some(WALLET));
        assert_eq!(hydrated.kyc_status.identity, CredentialStatus::None);
        assert_eq!(hydrated.kyc_status.age, CredentialStatus::None);
        assert_eq!(hydrated.kyc_status.human, CredentialStatus::None);
        assert!(hydrated.credentials.is_empty());
        assert_eq!(hydrated.subject_key, Some(derive_subject_key(WALLET).unwrap()));
    }

    #[test]
    fn records_follow_fixed_category_order() {
        let snap = snapshot_for(&[
            (LedgerField::CountryCommitments, "cc"),
            (LedgerField::HumanCommitments, "hc"),
            (LedgerField::AgeCommitments, "ac"),
            (LedgerField::IdentityRecords, "ic"),
        ]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        let ids: Vec<_> = hydrated.credentials.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["identity-ic", "age-ac", "human-hc", "country-cc"]);
        assert_eq!(hydrated.kyc_status.identity, CredentialStatus::Verified);
        assert_eq!(hydrated.kyc_status.age, CredentialStatus::Verified);
        assert_eq!(hydrated.kyc_status.human, CredentialStatus::Verified);
    }

    #[test]
    fn country_only_adds_a_record() {
        let snap = snapshot_for(&[(LedgerField::CountryCommitments, "cc")]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert_eq!(hydrated.kyc_status, KycStatus::default());
        assert_eq!(hydrated.credentials.len(), 1);
        assert_eq!(hydrated.credentials[0].credential_type, "Country");
    }

    #[test]
    fn issuer_defaults_to_holder() {
        let snap = snapshot_for(&[(LedgerField::HumanCommitments, "hc")]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert_eq!(hydrated.credentials[0].issuer, WALLET);

        let snap = snapshot_for(&[
            (LedgerField::HumanCommitments, "hc"),
            (LedgerField::HumanIssuers, "issuer-7"),
        ]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert_eq!(hydrated.credentials[0].issuer, "issuer-7");
    }

    #[test]
    fn age_metadata_never_carries_predicates() {
        let snap = snapshot_for(&[
            (LedgerField::AgeCommitments, "ac"),
            (LedgerField::AgeProofRefs, "ref-1"),
        ]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        let age = &hydrated.credentials[0];
        assert_eq!(age.metadata["commitment"], Value::String("ac".into()));
        assert_eq!(age.metadata["proofReference"], Value::String("ref-1".into()));
        for key in PRIVATE_PREDICATE_KEYS {
            assert!(!age.metadata.contains_key(key));
        }
    }

    #[test]
    fn expiry_is_one_year_after_hydration() {
        let now = Timestamp::parse("2026-03-01T00:00:00Z").unwrap();
        let snap = snapshot_for(&[(LedgerField::AgeCommitments, "ac")]);
        let hydrated = LedgerHydrator::new().hydrate_at(&snap, Some(WALLET), now);
        assert_eq!(hydrated.credentials[0].issued_at, now);
        assert_eq!(hydrated.credentials[0].expires_at.to_iso8601(), "2027-03-01T00:00:00Z");
    }

    #[test]
    fn revoked_subject_is_never_verified() {
        let snap = snapshot_for(&[
            (LedgerField::AgeCommitments, "ac"),
            (LedgerField::RevokedSubjects, "revoked"),
            (LedgerField::RevocationReasons, "document forged"),
        ]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert_eq!(hydrated.kyc_status.age, CredentialStatus::Revoked);
        assert_eq!(hydrated.credentials[0].status, CredentialStatus::Revoked);
        assert_eq!(
            hydrated.credentials[0].revocation_reason.as_deref(),
            Some("document forged")
        );
    }

    #[test]
    fn disclosure_attaches_only_to_matching_category() {
        let snap = snapshot_for(&[
            (LedgerField::AgeCommitments, "ac"),
            (LedgerField::HumanCommitments, "hc"),
        ]);
        let mut hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        let (age, human) = hydrated.credentials.split_at_mut(1);
        assert!(age[0].attach_disclosure(&verdict(ProofCategory::Age, true)));
        assert!(!human[0].attach_disclosure(&verdict(ProofCategory::Age, true)));
        assert_eq!(age[0].metadata["isAdult"], Value::Bool(true));
        assert!(!age[0].redacted().metadata.contains_key("isAdult"));
        assert!(human[0].attach_disclosure(&verdict(ProofCategory::Captcha, true)));
        assert!(human[0].metadata.contains_key("captchaPassed"));
    }

    #[test]
    fn unverified_result_discloses_nothing() {
        let snap = snapshot_for(&[(LedgerField::AgeCommitments, "ac")]);
        let mut hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert!(!hydrated.credentials[0].attach_disclosure(&verdict(ProofCategory::Age, false)));
        assert!(!hydrated.credentials[0].metadata.contains_key("isAdult"));
    }

    #[test]
    fn blank_commitment_is_not_a_credential() {
        let snap = snapshot_for(&[
            (LedgerField::AgeCommitments, ""),
            (LedgerField::HumanCommitments, "  "),
        ]);
        let hydrated = LedgerHydrator::new().hydrate(&snap, Some(WALLET));
        assert_eq!(hydrated.kyc_status.age, CredentialStatus::None);
        assert_eq!(hydrated.kyc_status.human, CredentialStatus::None);
        assert!(hydrated.credentials.is_empty());
    }

    #[test]
    fn status_serializes_as_names() {
        assert_eq!(serde_json::to_string(&CredentialStatus::None).unwrap(), "\"None\"");
        let json = serde_json::to_value(KycStatus::default()).unwrap();
        assert_eq!(json, serde_json::json!({"identity":"None","human":"None","age":"None"}));
    }
}
