//! # Credential and Proof Categories
//!
//! Two closed enums drive every per-category decision in the workspace:
//!
//! - [`CredentialCategory`] — the four commitment maps on the ledger.
//! - [`ProofCategory`] — the three predicates a relying party can ask about.
//!
//! Each proof category maps to exactly one credential category and one
//! disclosed predicate. Adding a variant forces every `match` downstream to
//! handle it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A credential category with its own commitment map on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialCategory {
    /// Identity registration.
    Identity,
    /// Age attestation (adult / not adult).
    Age,
    /// Human (liveness / CAPTCHA) verification.
    Human,
    /// Country of residence attestation.
    Country,
}

impl CredentialCategory {
    /// Every category, in hydration order.
    pub const ALL: [CredentialCategory; 4] = [
        CredentialCategory::Identity,
        CredentialCategory::Age,
        CredentialCategory::Human,
        CredentialCategory::Country,
    ];

    /// Lower-case name, used in credential ids and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Age => "age",
            Self::Human => "human",
            Self::Country => "country",
        }
    }

    /// Display name used in credential records.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Age => "Age",
            Self::Human => "Human",
            Self::Country => "Country",
        }
    }
}

impl std::fmt::Display for CredentialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CredentialCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "age" => Ok(Self::Age),
            "human" => Ok(Self::Human),
            "country" => Ok(Self::Country),
            other => Err(CoreError::InvalidIdentifier(format!(
                "unknown credential category: {other}"
            ))),
        }
    }
}

/// A predicate a relying party can ask to have proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofCategory {
    /// "Holder is at least 18", disclosed as `isAdult`.
    Age,
    /// "Holder resides in France", disclosed as `isFrance`.
    Country,
    /// "Holder passed a CAPTCHA", disclosed as `captchaPassed`.
    Captcha,
}

impl ProofCategory {
    /// Every proof category.
    pub const ALL: [ProofCategory; 3] = [
        ProofCategory::Age,
        ProofCategory::Country,
        ProofCategory::Captcha,
    ];

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Country => "country",
            Self::Captcha => "captcha",
        }
    }

    /// The credential whose commitment this proof is bound to.
    pub fn credential_category(&self) -> CredentialCategory {
        match self {
            Self::Age => CredentialCategory::Age,
            Self::Country => CredentialCategory::Country,
            Self::Captcha => CredentialCategory::Human,
        }
    }

    /// Name of the disclosed boolean in verification outcomes.
    pub fn predicate_name(&self) -> &'static str {
        match self {
            Self::Age => "isAdult",
            Self::Country => "isFrance",
            Self::Captcha => "captchaPassed",
        }
    }

    /// Suffix appended to the subject key in the proof store.
    ///
    /// Age proofs are stored under the bare subject key.
    pub fn store_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Age => None,
            Self::Country => Some("country"),
            Self::Captcha => Some("captcha"),
        }
    }

    /// Human-readable credential label used in outcome reasons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Country => "country",
            Self::Captcha => "human verification",
        }
    }

    /// Reason returned when no proof is available for this category.
    pub fn no_proof_reason(&self) -> &'static str {
        match self {
            Self::Age => {
                "No ZK proof available for verification. Age value cannot be read directly for privacy."
            }
            Self::Country => {
                "No ZK proof available for verification. Country value cannot be read directly for privacy."
            }
            Self::Captcha => {
                "No ZK proof available for verification. CAPTCHA result cannot be read directly for privacy."
            }
        }
    }
}

impl std::fmt::Display for ProofCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProofCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age" => Ok(Self::Age),
            "country" => Ok(Self::Country),
            "captcha" => Ok(Self::Captcha),
            _ => Err(CoreError::UnsupportedProofType(s.to_string())),
        }
    }
}
