//! # Ledger Field Codec
//!
//! Each contract field stores a map from subject key to string as JSON text.
//! Depending on the indexer, the text may arrive bare or wrapped in a
//! `{ "value": ... }` envelope. Parsing is best-effort: anything that is not
//! a JSON object yields an empty map and the caller carries on.
//!
//! Serialization emits keys in sorted order with compact separators, so an
//! unchanged map always produces identical bytes.

use std::collections::BTreeMap;

use serde_json::Value;

/// A decoded ledger field: subject key (or other key) to string value.
pub type LedgerMap = BTreeMap<String, String>;

/// Decode a raw field value into a map. Never fails.
///
/// - One optional `{ "value": ... }` envelope is unwrapped first.
/// - The unwrapped value must be a non-blank string holding a JSON object.
/// - `null` members are dropped; other non-string members are stringified.
pub fn parse_field(raw: &Value) -> LedgerMap {
    let inner = unwrap_envelope(raw);
    let text = match inner {
        Value::String(s) if !s.trim().is_empty() => s,
        _ => return LedgerMap::new(),
    };

    let parsed = match serde_json::from_str::<Value>(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, len = text.len(), "unparseable ledger field, treating as empty");
            return LedgerMap::new();
        }
    };

    match parsed {
        Value::Object(members) => members
            .into_iter()
            .filter_map(|(k, v)| stringify_member(v).map(|s| (k, s)))
            .collect(),
        _ => LedgerMap::new(),
    }
}

/// Decode a field given as bare JSON text.
pub fn parse_field_str(raw: &str) -> LedgerMap {
    parse_field(&Value::String(raw.to_string()))
}

/// Encode a map as compact JSON with sorted keys.
pub fn serialize_map(map: &LedgerMap) -> String {
    let object: serde_json::Map<String, Value> = map
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(object).to_string()
}

fn unwrap_envelope(raw: &Value) -> &Value {
    match raw {
        Value::Object(obj) => obj.get("value").unwrap_or(raw),
        _ => raw,
    }
}

fn stringify_member(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}
