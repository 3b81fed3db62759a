//! # Proof Keys
//!
//! Age proofs are stored under the bare subject key. Country and CAPTCHA
//! proofs append `:country` / `:captcha`, so one subject holds at most one
//! proof per category.

use std::str::FromStr;

use kyc_core::{ProofCategory, SubjectKey};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Storage key for a proof: subject plus proof category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProofKey {
    subject: SubjectKey,
    category: ProofCategory,
}

impl ProofKey {
    pub fn new(subject: SubjectKey, category: ProofCategory) -> Self {
        Self { subject, category }
    }

    /// Key for the category's proof of `subject`.
    pub fn for_category(subject: &SubjectKey, category: ProofCategory) -> Self {
        Self::new(subject.clone(), category)
    }

    pub fn subject(&self) -> &SubjectKey {
        &self.subject
    }

    pub fn category(&self) -> ProofCategory {
        self.category
    }

    /// Parse a rendered key (`0x…` or `0x…:country` / `0x…:captcha`).
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        let (subject, suffix) = match s.split_once(':') {
            Some((subject, suffix)) => (subject, Some(suffix)),
            None => (s, None),
        };
        let category = match suffix {
            None => ProofCategory::Age,
            Some(suffix) => ProofCategory::ALL
                .into_iter()
                .find(|c| c.store_suffix() == Some(suffix))
                .ok_or_else(|| StoreError::InvalidKey(s.to_string()))?,
        };
        let subject = SubjectKey::parse(subject).map_err(|_| StoreError::InvalidKey(s.to_string()))?;
        Ok(Self { subject, category })
    }
}

impl std::fmt::Display for ProofKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.category.store_suffix() {
            Some(suffix) => write!(f, "{}:{suffix}", self.subject),
            None => write!(f, "{}", self.subject),
        }
    }
}

impl FromStr for ProofKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProofKey {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProofKey> for String {
    fn from(key: ProofKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::derive_subject_key;

    #[test]
    fn age_uses_bare_subject_key() {
        let subject = derive_subject_key("alice").unwrap();
        let key = ProofKey::for_category(&subject, ProofCategory::Age);
        assert_eq!(key.to_string(), subject.as_str());
    }

    #[test]
    fn other_categories_are_suffixed() {
        let subject = derive_subject_key("alice").unwrap();
        assert_eq!(
            ProofKey::for_category(&subject, ProofCategory::Country).to_string(),
            format!("{subject}:country")
        );
        assert_eq!(
            ProofKey::for_category(&subject, ProofCategory::Captcha).to_string(),
            format!("{subject}:captcha")
        );
    }

    #[test]
    fn parse_inverts_display() {
        let subject = derive_subject_key("bob").unwrap();
        for category in ProofCategory::ALL {
            let key = ProofKey::for_category(&subject, category);
            assert_eq!(ProofKey::parse(&key.to_string()).unwrap(), key);
        }
    }

    #[test]
    fn parse_rejects_bad_keys() {
        let subject = derive_subject_key("bob").unwrap();
        assert!(ProofKey::parse("bob").is_err());
        assert!(ProofKey::parse(&format!("{subject}:age")).is_err());
        assert!(ProofKey::parse(&format!("{subject}:")).is_err());
        assert!(ProofKey::parse("").is_err());
    }
}
