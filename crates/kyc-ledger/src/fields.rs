//! # Ledger Field Names
//!
//! The credential contract exposes fifteen public fields, each holding a
//! JSON-encoded map keyed by subject key. Four credential categories own a
//! (commitments, proof references, issuers) triple; revocation owns a
//! (marker, reason, issuer) triple.

use std::collections::BTreeMap;

use kyc_core::CredentialCategory;
use serde::{Deserialize, Serialize};

/// One public field of the credential contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerField {
    #[serde(rename = "identityRecords")]
    IdentityRecords,
    #[serde(rename = "identityMetadata")]
    IdentityMetadata,
    #[serde(rename = "identityIssuer")]
    IdentityIssuer,
    #[serde(rename = "ageCommitments")]
    AgeCommitments,
    #[serde(rename = "ageProofRefs")]
    AgeProofRefs,
    #[serde(rename = "ageIssuers")]
    AgeIssuers,
    #[serde(rename = "humanCommitments")]
    HumanCommitments,
    #[serde(rename = "humanProofRefs")]
    HumanProofRefs,
    #[serde(rename = "humanIssuers")]
    HumanIssuers,
    #[serde(rename = "countryCommitments")]
    CountryCommitments,
    #[serde(rename = "countryProofRefs")]
    CountryProofRefs,
    #[serde(rename = "countryIssuers")]
    CountryIssuers,
    #[serde(rename = "revokedSubjects")]
    RevokedSubjects,
    #[serde(rename = "revocationReasons")]
    RevocationReasons,
    #[serde(rename = "revocationIssuers")]
    RevocationIssuers,
}

impl LedgerField {
    /// Every field the contract exposes.
    pub const ALL: [LedgerField; 15] = [
        LedgerField::IdentityRecords,
        LedgerField::IdentityMetadata,
        LedgerField::IdentityIssuer,
        LedgerField::AgeCommitments,
        LedgerField::AgeProofRefs,
        LedgerField::AgeIssuers,
        LedgerField::HumanCommitments,
        LedgerField::HumanProofRefs,
        LedgerField::HumanIssuers,
        LedgerField::CountryCommitments,
        LedgerField::CountryProofRefs,
        LedgerField::CountryIssuers,
        LedgerField::RevokedSubjects,
        LedgerField::RevocationReasons,
        LedgerField::RevocationIssuers,
    ];

    /// Contract field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentityRecords => "identityRecords",
            Self::IdentityMetadata => "identityMetadata",
            Self::IdentityIssuer => "identityIssuer",
            Self::AgeCommitments => "ageCommitments",
            Self::AgeProofRefs => "ageProofRefs",
            Self::AgeIssuers => "ageIssuers",
            Self::HumanCommitments => "humanCommitments",
            Self::HumanProofRefs => "humanProofRefs",
            Self::HumanIssuers => "humanIssuers",
            Self::CountryCommitments => "countryCommitments",
            Self::CountryProofRefs => "countryProofRefs",
            Self::CountryIssuers => "countryIssuers",
            Self::RevokedSubjects => "revokedSubjects",
            Self::RevocationReasons => "revocationReasons",
            Self::RevocationIssuers => "revocationIssuers",
        }
    }
}

impl std::fmt::Display for LedgerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (commitments, proof references, issuers) triple for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFields {
    pub commitments: LedgerField,
    pub proof_refs: LedgerField,
    pub issuers: LedgerField,
}

/// Field triple owned by a credential category.
///
/// For Identity the proof-reference slot is the identity metadata map.
pub fn category_fields(category: CredentialCategory) -> CategoryFields {
    match category {
        CredentialCategory::Identity => CategoryFields {
            commitments: LedgerField::IdentityRecords,
            proof_refs: LedgerField::IdentityMetadata,
            issuers: LedgerField::IdentityIssuer,
        },
        CredentialCategory::Age => CategoryFields {
            commitments: LedgerField::AgeCommitments,
            proof_refs: LedgerField::AgeProofRefs,
            issuers: LedgerField::AgeIssuers,
        },
        CredentialCategory::Human => CategoryFields {
            commitments: LedgerField::HumanCommitments,
            proof_refs: LedgerField::HumanProofRefs,
            issuers: LedgerField::HumanIssuers,
        },
        CredentialCategory::Country => CategoryFields {
            commitments: LedgerField::CountryCommitments,
            proof_refs: LedgerField::CountryProofRefs,
            issuers: LedgerField::CountryIssuers,
        },
    }
}

/// Raw contract state as returned by a ledger reader: field name to the
/// undecoded field value.
///
/// Unknown field names are kept; the snapshot only reads the ones it knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLedgerFields(pub BTreeMap<String, serde_json::Value>);

impl RawLedgerFields {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for a field, if the reader returned one.
    pub fn get(&self, field: LedgerField) -> Option<&serde_json::Value> {
        self.0.get(field.as_str())
    }

    /// Set a field to a raw value.
    pub fn insert(&mut self, field: LedgerField, value: serde_json::Value) {
        self.0.insert(field.as_str().to_string(), value);
    }
}
