//! # kyc-cli — Operator CLI for the KYC Commitment Ledger
//!
//! ## Subcommands
//!
//! - `kyc hash` — Subject keys and credential commitments.
//! - `kyc prove` — Mock predicate proofs for local testing.
//! - `kyc proofs` — File proof store maintenance.
//! - `kyc ledger` — Read the ledger: holder status and verification.
//!
//! ```bash
//! kyc hash subject mn_addr_test1qxyz
//! kyc hash commitment claims.json
//! kyc prove --category age --commitment 0xabc --value true
//! kyc proofs --store data/proofs.json sweep
//! kyc ledger status --wallet mn_addr_test1qxyz
//! ```

pub mod hash;
pub mod ledger;
pub mod proofs;
pub mod prove;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Single-threaded runtime for the async subcommands.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Read a JSON or YAML document from a file, or from stdin when `path` is `-`.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML; everything else as
/// JSON.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("claims.json");
        std::fs::write(&json_path, r#"{"age": 30}"#).unwrap();
        assert_eq!(read_document(&json_path).unwrap(), json!({"age": 30}));

        let yaml_path = dir.path().join("claims.yaml");
        std::fs::write(&yaml_path, "age: 30\ncountry: FR\n").unwrap();
        assert_eq!(
            read_document(&yaml_path).unwrap(),
            json!({"age": 30, "country": "FR"})
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_document(&dir.path().join("absent.json")).is_err());
    }
}
