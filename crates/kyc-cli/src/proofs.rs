//! # Proofs Subcommand
//!
//! Maintenance for the file-backed proof store the API uses by default.
//!
//! - `list` — Unexpired proof keys and expiry times.
//! - `put` — Store a proof envelope under a key.
//! - `remove` — Delete one proof.
//! - `sweep` — Delete every expired proof.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use kyc_store::{FileProofStore, ProofKey, ProofStore, DEFAULT_TTL_DAYS};
use kyc_zkp::PresentedProof;

use crate::{print_json, read_document, runtime};

#[derive(Args, Debug)]
pub struct ProofsArgs {
    /// Proof store file.
    #[arg(long, default_value = "data/proofs.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: ProofsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProofsCommand {
    /// List unexpired proofs.
    List,
    /// Store a proof envelope.
    Put {
        /// `<subject key>` or `<subject key>:<country|captcha>`.
        #[arg(long)]
        key: String,
        /// Envelope file (JSON or YAML), or `-` for stdin.
        #[arg(long)]
        proof: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TTL_DAYS)]
        ttl_days: i64,
    },
    /// Remove one proof.
    Remove {
        key: String,
    },
    /// Delete every expired proof.
    Sweep,
}

pub fn run_proofs(args: &ProofsArgs) -> Result<u8> {
    let store = FileProofStore::new(args.store.clone());
    runtime()?.block_on(execute(&store, &args.command))
}

async fn execute(store: &FileProofStore, command: &ProofsCommand) -> Result<u8> {
    match command {
        ProofsCommand::List => {
            let entries = store.list_valid().await?;
            let listed: Vec<_> = entries
                .iter()
                .map(|(key, stored)| {
                    serde_json::json!({
                        "key": key.to_string(),
                        "category": key.category(),
                        "expiresAt": stored.expires_at.map(|at| at.to_iso8601()),
                    })
                })
                .collect();
            print_json(&listed)?;
            Ok(0)
        }
        ProofsCommand::Put {
            key,
            proof,
            ttl_days,
        } => {
            if *ttl_days <= 0 {
                bail!("--ttl-days must be positive");
            }
            let key = ProofKey::parse(key)?;
            let envelope = PresentedProof::from_value(&read_document(proof)?)
                .context("invalid proof envelope")?;
            let expires_at = store
                .store(&key, envelope, chrono::Duration::days(*ttl_days))
                .await?;
            println!("stored {key} until {expires_at}");
            Ok(0)
        }
        ProofsCommand::Remove { key } => {
            let key = ProofKey::parse(key)?;
            if store.remove(&key).await? {
                println!("removed {key}");
                Ok(0)
            } else {
                eprintln!("no proof stored under {key}");
                Ok(2)
            }
        }
        ProofsCommand::Sweep => {
            let removed = store.sweep_expired().await?;
            println!("removed {removed} expired proof(s)");
            Ok(0)
        }
    }
}
