//! # Hash Subcommand
//!
//! - `subject <identifier>` — Derive the subject key the ledger maps use.
//! - `commitment <file>` — Canonical credential hash of a JSON/YAML claim set.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kyc_core::{derive_subject_key, generate_credential_hash};

use crate::read_document;

#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(subcommand)]
    pub command: HashCommand,
}

#[derive(Subcommand, Debug)]
pub enum HashCommand {
    /// Derive a subject key from a wallet address or other identifier.
    Subject {
        identifier: String,
    },
    /// Hash credential data into a commitment. Floats are rejected.
    Commitment {
        /// JSON or YAML file, or `-` for stdin.
        file: PathBuf,
    },
}

pub fn run_hash(args: &HashArgs) -> Result<u8> {
    match &args.command {
        HashCommand::Subject { identifier } => {
            let key = derive_subject_key(identifier).context("cannot derive subject key")?;
            println!("{key}");
        }
        HashCommand::Commitment { file } => {
            let data = read_document(file)?;
            let commitment =
                generate_credential_hash(&data).context("credential data cannot be hashed")?;
            println!("{}", commitment.as_str());
        }
    }
    Ok(0)
}
