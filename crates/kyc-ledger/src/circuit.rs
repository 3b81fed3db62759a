//! # Contract Circuits and Mutation Envelopes
//!
//! The credential contract exposes one circuit per credential category plus
//! a revocation circuit. Each circuit overwrites a fixed, ordered list of
//! fields with the serialized maps passed as arguments.

use kyc_core::{CredentialCategory, SubjectKey};
use serde::{Deserialize, Serialize};

use crate::fields::{category_fields, LedgerField};

/// Finalized status that counts as success.
pub const SUCCESS_STATUS: &str = "SucceedEntirely";

/// A contract circuit that mutates ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Circuit {
    #[serde(rename = "registerIdentity")]
    RegisterIdentity,
    #[serde(rename = "issueAgeCredential")]
    IssueAgeCredential,
    #[serde(rename = "issueCountryCredential")]
    IssueCountryCredential,
    #[serde(rename = "recordHumanVerification")]
    RecordHumanVerification,
    #[serde(rename = "revokeLastCredential")]
    RevokeLastCredential,
}

impl Circuit {
    /// Every circuit.
    pub const ALL: [Circuit; 5] = [
        Circuit::RegisterIdentity,
        Circuit::IssueAgeCredential,
        Circuit::IssueCountryCredential,
        Circuit::RecordHumanVerification,
        Circuit::RevokeLastCredential,
    ];

    /// The issuance circuit for a credential category.
    pub fn for_category(category: CredentialCategory) -> Self {
        match category {
            CredentialCategory::Identity => Self::RegisterIdentity,
            CredentialCategory::Age => Self::IssueAgeCredential,
            CredentialCategory::Country => Self::IssueCountryCredential,
            CredentialCategory::Human => Self::RecordHumanVerification,
        }
    }

    /// Contract circuit name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisterIdentity => "registerIdentity",
            Self::IssueAgeCredential => "issueAgeCredential",
            Self::IssueCountryCredential => "issueCountryCredential",
            Self::RecordHumanVerification => "recordHumanVerification",
            Self::RevokeLastCredential => "revokeLastCredential",
        }
    }

    /// Whether the contract checks the subject key alongside the issuer key.
    pub fn binds_subject(&self) -> bool {
        matches!(self, Self::IssueAgeCredential | Self::RevokeLastCredential)
    }

    /// Fields overwritten by this circuit, in argument order.
    pub fn fields(&self) -> [LedgerField; 3] {
        let triple = |c| {
            let f = category_fields(c);
            [f.commitments, f.proof_refs, f.issuers]
        };
        match self {
            Self::RegisterIdentity => triple(CredentialCategory::Identity),
            Self::IssueAgeCredential => triple(CredentialCategory::Age),
            Self::IssueCountryCredential => triple(CredentialCategory::Country),
            Self::RecordHumanVerification => triple(CredentialCategory::Human),
            Self::RevokeLastCredential => [
                LedgerField::RevocationReasons,
                LedgerField::RevocationIssuers,
                LedgerField::RevokedSubjects,
            ],
        }
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 32-byte values the contract checks before accepting a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityParams {
    /// Subject key of the issuer identifier, as 32 bytes (hex on the wire).
    #[serde(with = "hex32")]
    pub issuer_public_key: [u8; 32],
    /// Subject the mutation is about. Only circuits that
    /// [bind the subject](Circuit::binds_subject) carry it.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hex32_opt")]
    pub subject_key: Option<[u8; 32]>,
}

impl SecurityParams {
    /// Issuer key only.
    pub fn for_issuer(issuer_key: &SubjectKey) -> Self {
        Self {
            issuer_public_key: issuer_key.to_bytes32(),
            subject_key: None,
        }
    }

    /// Parameters for issuing through `circuit`, adding the subject key
    /// when the circuit binds it.
    pub fn for_issuance(circuit: Circuit, issuer_key: &SubjectKey, subject: &SubjectKey) -> Self {
        Self {
            issuer_public_key: issuer_key.to_bytes32(),
            subject_key: circuit.binds_subject().then(|| subject.to_bytes32()),
        }
    }

    /// Parameters for the revocation circuit.
    pub fn for_revocation(issuer_key: &SubjectKey, subject: &SubjectKey) -> Self {
        Self {
            issuer_public_key: issuer_key.to_bytes32(),
            subject_key: Some(subject.to_bytes32()),
        }
    }
}

/// A complete mutation request for the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerMutation {
    pub circuit: Circuit,
    /// Serialized maps, in [`Circuit::fields`] order.
    pub arguments: Vec<String>,
    pub security: SecurityParams,
}

/// Acknowledgement of a finalized mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationReceipt {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    /// Finalization status reported by the ledger.
    pub status: String,
    /// Public contract outputs, if the gateway returns them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_data: Option<serde_json::Value>,
}

impl MutationReceipt {
    /// True if the mutation finalized with [`SUCCESS_STATUS`].
    pub fn succeeded(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(text.trim_start_matches("0x"), &mut out)
            .map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}

mod hex32_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<[u8; 32]>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_some(&hex::encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[u8; 32]>, D::Error> {
        let Some(text) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        let mut out = [0u8; 32];
        hex::decode_to_slice(text.trim_start_matches("0x"), &mut out)
            .map_err(serde::de::Error::custom)?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::derive_subject_key;

    #[test]
    fn circuit_for_category() {
        assert_eq!(
            Circuit::for_category(CredentialCategory::Human),
            Circuit::RecordHumanVerification
        );
        assert_eq!(Circuit::for_category(CredentialCategory::Identity).as_str(), "registerIdentity");
    }

    #[test]
    fn revocation_field_order() {
        assert_eq!(
            Circuit::RevokeLastCredential.fields(),
            [
                LedgerField::RevocationReasons,
                LedgerField::RevocationIssuers,
                LedgerField::RevokedSubjects
            ]
        );
    }

    #[test]
    fn security_params_wire_format() {
        let issuer = derive_subject_key("issuer").unwrap();
        let subject = derive_subject_key("alice").unwrap();
        let params = SecurityParams::for_revocation(&issuer, &subject);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["issuerPublicKey"], issuer.as_str()[2..]);
        assert_eq!(json["subjectKey"], subject.as_str()[2..]);
        let back: SecurityParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn issuance_params_omit_subject() {
        let issuer = derive_subject_key("issuer").unwrap();
        let json = serde_json::to_value(SecurityParams::for_issuer(&issuer)).unwrap();
        assert!(json.get("subjectKey").is_none());
        let back: SecurityParams = serde_json::from_value(json).unwrap();
        assert!(back.subject_key.is_none());
    }

    #[test]
    fn only_age_and_revocation_bind_the_subject() {
        let issuer = derive_subject_key("issuer").unwrap();
        let subject = derive_subject_key("alice").unwrap();
        for circuit in Circuit::ALL {
            let params = SecurityParams::for_issuance(circuit, &issuer, &subject);
            let expected = matches!(
                circuit,
                Circuit::IssueAgeCredential | Circuit::RevokeLastCredential
            );
            assert_eq!(params.subject_key.is_some(), expected, "{}", circuit.as_str());
            assert_eq!(params.issuer_public_key, issuer.to_bytes32());
        }
        let age = SecurityParams::for_issuance(Circuit::IssueAgeCredential, &issuer, &subject);
        assert_eq!(age.subject_key, Some(subject.to_bytes32()));
    }

    #[test]
    fn receipt_success_status() {
        let receipt = MutationReceipt {
            transaction_id: "tx".into(),
            block_height: Some(4),
            status: SUCCESS_STATUS.into(),
            public_data: None,
        };
        assert!(receipt.succeeded());
    }
}
