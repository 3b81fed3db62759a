//! # Presented Proofs
//!
//! The envelope a holder (or issuer, on their behalf) submits for a
//! predicate: the commitment the proof is bound to, the opaque proof bytes,
//! and the public statement. The engine never interprets `proof`; only a
//! [`crate::PredicateVerifier`] does.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a value could not be read as a [`PresentedProof`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProofEnvelopeError {
    /// The value is not a JSON object (or JSON text holding one).
    #[error("proof must be a JSON object")]
    NotAnObject,
    /// A required field is missing, null, or empty.
    #[error("Invalid proof structure: missing {0}")]
    MissingField(&'static str),
}

/// A proof envelope as stored and presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedProof {
    /// Commitment the proof claims to be bound to.
    pub commitment: String,
    /// Opaque proof payload.
    pub proof: Value,
    /// Public statement being proven.
    pub statement: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_inputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PresentedProof {
    /// Validate and read an envelope from a JSON object.
    ///
    /// `commitment`, `proof`, and `statement` must be present and non-empty.
    pub fn from_value(value: &Value) -> Result<Self, ProofEnvelopeError> {
        let obj = value.as_object().ok_or(ProofEnvelopeError::NotAnObject)?;
        let commitment = obj
            .get("commitment")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ProofEnvelopeError::MissingField("commitment"))?;
        let proof = required(obj.get("proof")).ok_or(ProofEnvelopeError::MissingField("proof"))?;
        let statement =
            required(obj.get("statement")).ok_or(ProofEnvelopeError::MissingField("statement"))?;

        Ok(Self {
            commitment: commitment.to_string(),
            proof: proof.clone(),
            statement: statement.clone(),
            public_inputs: obj.get("publicInputs").filter(|v| !v.is_null()).cloned(),
            created_at: obj
                .get("createdAt")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// Read a caller-supplied proof: either a JSON object or a string
    /// holding one. Unparseable input yields `None`.
    pub fn from_caller(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text).ok()?;
                Self::from_value(&parsed).ok()
            }
            Value::Object(_) => Self::from_value(value).ok(),
            _ => None,
        }
    }
}

fn required(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    })
}
