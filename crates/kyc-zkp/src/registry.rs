//! # Verifier Registry
//!
//! One verifier per [`ProofCategory`], resolved by exhaustive `match`.

use std::sync::Arc;

use kyc_core::ProofCategory;

use crate::cache::VerifyingKeyCache;
use crate::mock::{MockPredicateVerifier, MockVerifyingKey};
use crate::traits::PredicateVerifier;

/// The verifiers available to the verification engine.
#[derive(Clone)]
pub struct VerifierRegistry {
    age: Arc<dyn PredicateVerifier>,
    country: Arc<dyn PredicateVerifier>,
    captcha: Arc<dyn PredicateVerifier>,
}

impl std::fmt::Debug for VerifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierRegistry")
            .field("age", &self.age.category())
            .field("country", &self.country.category())
            .field("captcha", &self.captcha.category())
            .finish()
    }
}

impl VerifierRegistry {
    pub fn new(
        age: Arc<dyn PredicateVerifier>,
        country: Arc<dyn PredicateVerifier>,
        captcha: Arc<dyn PredicateVerifier>,
    ) -> Self {
        Self {
            age,
            country,
            captcha,
        }
    }

    /// Mock verifiers for every category, sharing one key cache.
    pub fn mock() -> Self {
        Self::mock_with_cache(Arc::new(VerifyingKeyCache::new()))
    }

    pub fn mock_with_cache(cache: Arc<VerifyingKeyCache<MockVerifyingKey>>) -> Self {
        tracing::warn!("using mock predicate verifiers; proofs are NOT zero-knowledge");
        let make = |category| -> Arc<dyn PredicateVerifier> {
            Arc::new(MockPredicateVerifier::new(category, cache.clone()))
        };
        Self::new(
            make(ProofCategory::Age),
            make(ProofCategory::Country),
            make(ProofCategory::Captcha),
        )
    }

    /// The verifier for a category.
    pub fn get(&self, category: ProofCategory) -> &Arc<dyn PredicateVerifier> {
        match category {
            ProofCategory::Age => &self.age,
            ProofCategory::Country => &self.country,
            ProofCategory::Captcha => &self.captcha,
        }
    }
}
