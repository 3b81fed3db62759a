//! # Prove Subcommand
//!
//! Produces mock predicate proofs bound to a commitment. These proofs are
//! hash-bound, not zero-knowledge; they exist so a local deployment can be
//! exercised end to end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kyc_core::{CommitmentHash, ProofCategory};
use kyc_zkp::MockPredicateProver;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CategoryArg {
    Age,
    Country,
    Captcha,
}

impl From<CategoryArg> for ProofCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Age => ProofCategory::Age,
            CategoryArg::Country => ProofCategory::Country,
            CategoryArg::Captcha => ProofCategory::Captcha,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProveArgs {
    #[arg(long, value_enum, default_value = "age")]
    pub category: CategoryArg,
    /// Commitment the proof is bound to.
    #[arg(long)]
    pub commitment: String,
    /// Predicate value to attest.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub value: bool,
    /// Write the envelope here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run_prove(args: &ProveArgs) -> Result<u8> {
    tracing::warn!("mock proofs are not zero-knowledge; use only for local testing");
    let commitment = CommitmentHash::new(args.commitment.as_str()).context("invalid commitment")?;
    let proof = MockPredicateProver::new()
        .prove(args.category.into(), &commitment, args.value)
        .context("failed to build proof")?;
    let text = serde_json::to_string_pretty(&proof)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "proof written");
        }
        None => println!("{text}"),
    }
    Ok(0)
}
