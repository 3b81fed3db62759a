//! # Commitment Ledger Snapshot
//!
//! An immutable, decoded view of the contract state at one read. Every
//! accessor is keyed by [`SubjectKey`] and returns `None` on absence; a
//! snapshot never errors after construction. A blank entry is absent.

use std::collections::BTreeMap;

use kyc_core::{CredentialCategory, SubjectKey};

use crate::codec::{parse_field, LedgerMap};
use crate::fields::{category_fields, LedgerField, RawLedgerFields};

/// Decoded per-category commitment, proof-reference, issuer, and revocation
/// maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitmentLedgerSnapshot {
    maps: BTreeMap<LedgerField, LedgerMap>,
}

impl CommitmentLedgerSnapshot {
    /// A snapshot with no entries. Used when the ledger has no state yet or
    /// could not be read.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode every known field of a raw contract state.
    pub fn from_raw(raw: &RawLedgerFields) -> Self {
        let maps = LedgerField::ALL
            .iter()
            .filter_map(|field| {
                let map = raw.get(*field).map(parse_field)?;
                (!map.is_empty()).then_some((*field, map))
            })
            .collect();
        Self { maps }
    }

    /// Build directly from decoded maps.
    pub fn from_maps(maps: impl IntoIterator<Item = (LedgerField, LedgerMap)>) -> Self {
        Self {
            maps: maps.into_iter().filter(|(_, m)| !m.is_empty()).collect(),
        }
    }

    /// True if no field holds any entry.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Borrow a decoded field, if it has entries.
    pub fn field(&self, field: LedgerField) -> Option<&LedgerMap> {
        self.maps.get(&field)
    }

    /// Owned copy of a field, the starting point for the next version of
    /// that field during issuance.
    pub fn map(&self, field: LedgerField) -> LedgerMap {
        self.maps.get(&field).cloned().unwrap_or_default()
    }

    fn lookup(&self, field: LedgerField, key: &SubjectKey) -> Option<&str> {
        self.maps
            .get(&field)
            .and_then(|m| m.get(key.as_str()))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Live commitment for a subject in a category.
    pub fn commitment(&self, category: CredentialCategory, key: &SubjectKey) -> Option<&str> {
        self.lookup(category_fields(category).commitments, key)
    }

    /// Proof reference (identity metadata for Identity).
    pub fn proof_reference(&self, category: CredentialCategory, key: &SubjectKey) -> Option<&str> {
        self.lookup(category_fields(category).proof_refs, key)
    }

    /// Issuer recorded with the commitment.
    pub fn issuer(&self, category: CredentialCategory, key: &SubjectKey) -> Option<&str> {
        self.lookup(category_fields(category).issuers, key)
    }

    /// True if the subject carries a non-blank revocation marker.
    pub fn is_revoked(&self, key: &SubjectKey) -> bool {
        self.lookup(LedgerField::RevokedSubjects, key).is_some()
    }

    /// Reason recorded when the subject was revoked.
    pub fn revocation_reason(&self, key: &SubjectKey) -> Option<&str> {
        self.lookup(LedgerField::RevocationReasons, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::derive_subject_key;
    use serde_json::json;

    fn raw_with(field: LedgerField, entries: serde_json::Value) -> RawLedgerFields {
        let mut raw = RawLedgerFields::new();
        raw.insert(field, json!(entries.to_string()));
        raw
    }

    #[test]
    fn lookup_by_category() {
        let key = derive_subject_key("alice").unwrap();
        let mut raw = raw_with(
            LedgerField::AgeCommitments,
            json!({ key.as_str(): "0xc0ffee" }),
        );
        raw.insert(
            LedgerField::AgeProofRefs,
            json!({ "value": json!({ key.as_str(): "ref-1" }).to_string() }),
        );
        let snap = CommitmentLedgerSnapshot::from_raw(&raw);
        assert_eq!(snap.commitment(CredentialCategory::Age, &key), Some("0xc0ffee"));
        assert_eq!(snap.proof_reference(CredentialCategory::Age, &key), Some("ref-1"));
        assert_eq!(snap.commitment(CredentialCategory::Human, &key), None);
        assert_eq!(snap.issuer(CredentialCategory::Age, &key), None);
    }

    #[test]
    fn revocation_marker() {
        let alice = derive_subject_key("alice").unwrap();
        let bob = derive_subject_key("bob").unwrap();
        let mut raw = raw_with(
            LedgerField::RevokedSubjects,
            json!({ alice.as_str(): "revoked", bob.as_str(): "" }),
        );
        raw.insert(
            LedgerField::RevocationReasons,
            json!(json!({ alice.as_str(): "fraud" }).to_string()),
        );
        let snap = CommitmentLedgerSnapshot::from_raw(&raw);
        assert!(snap.is_revoked(&alice));
        assert!(!snap.is_revoked(&bob));
        assert_eq!(snap.revocation_reason(&alice), Some("fraud"));
    }

    #[test]
    fn blank_entries_are_absent() {
        let alice = derive_subject_key("alice").unwrap();
        let mut raw = raw_with(LedgerField::AgeCommitments, json!({ alice.as_str(): "" }));
        raw.insert(
            LedgerField::HumanCommitments,
            json!(json!({ alice.as_str(): "   " }).to_string()),
        );
        raw.insert(
            LedgerField::RevokedSubjects,
            json!(json!({ alice.as_str(): " " }).to_string()),
        );
        let snap = CommitmentLedgerSnapshot::from_raw(&raw);
        assert_eq!(snap.commitment(CredentialCategory::Age, &alice), None);
        assert_eq!(snap.commitment(CredentialCategory::Human, &alice), None);
        assert!(!snap.is_revoked(&alice));
    }

    #[test]
    fn garbage_fields_give_empty_snapshot() {
        let mut raw = RawLedgerFields::new();
        raw.insert(LedgerField::AgeCommitments, json!("not-json"));
        raw.insert(LedgerField::HumanCommitments, json!(null));
        let snap = CommitmentLedgerSnapshot::from_raw(&raw);
        assert!(snap.is_empty());
        assert!(snap.map(LedgerField::AgeCommitments).is_empty());
    }

    #[test]
    fn map_returns_independent_copy() {
        let key = derive_subject_key("alice").unwrap();
        let raw = raw_with(LedgerField::HumanCommitments, json!({ key.as_str(): "h1" }));
        let snap = CommitmentLedgerSnapshot::from_raw(&raw);
        let mut copy = snap.map(LedgerField::HumanCommitments);
        copy.insert("0xother".into(), "h2".into());
        assert_eq!(snap.field(LedgerField::HumanCommitments).unwrap().len(), 1);
    }
}
