//! # Ledger Subcommand
//!
//! Reads the credential contract through the ledger gateway.
//!
//! - `status --wallet W` — Credential status with predicates redacted.
//! - `verify --wallet W --commitment C` — Run a verification locally
//!   against the gateway and a proof store file.
//!
//! The gateway comes from `--url`/`--contract`/`--token` or, when `--url`
//! is omitted, from `KYC_LEDGER_URL`, `KYC_LEDGER_CONTRACT` and
//! `KYC_LEDGER_TOKEN`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kyc_engine::{CredentialStatusService, ProofVerificationEngine, VerificationRequest};
use kyc_ledger::{HttpLedgerClient, LedgerClientConfig, LedgerHydrator};
use kyc_store::FileProofStore;
use kyc_zkp::VerifierRegistry;

use crate::prove::CategoryArg;
use crate::{print_json, read_document, runtime};

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger gateway base URL.
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// Contract address. Required with `--url`.
    #[arg(long, global = true)]
    pub contract: Option<String>,
    /// Gateway bearer token.
    #[arg(long, global = true)]
    pub token: Option<String>,
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Show a holder's credential status.
    Status {
        #[arg(long)]
        wallet: String,
    },
    /// Verify a predicate for a holder.
    Verify {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        commitment: String,
        #[arg(long, value_enum, default_value = "age")]
        category: CategoryArg,
        /// Proof envelope file. Falls back to the proof store when absent.
        #[arg(long)]
        proof: Option<PathBuf>,
        /// Proof store file.
        #[arg(long, default_value = "data/proofs.json")]
        store: PathBuf,
    },
}

impl LedgerArgs {
    fn client_config(&self) -> Result<LedgerClientConfig> {
        match &self.url {
            Some(url) => {
                let contract = self
                    .contract
                    .as_deref()
                    .context("--contract is required with --url")?;
                Ok(LedgerClientConfig::new(
                    url,
                    contract,
                    self.token.clone(),
                    self.timeout_secs,
                )?)
            }
            None => LedgerClientConfig::from_env()
                .context("no --url given and ledger environment is incomplete"),
        }
    }
}

pub fn run_ledger(args: &LedgerArgs) -> Result<u8> {
    let client = Arc::new(HttpLedgerClient::new(args.client_config()?)?);
    let rt = runtime()?;

    match &args.command {
        LedgerCommand::Status { wallet } => {
            let service = CredentialStatusService::new(client, LedgerHydrator::new());
            let view = rt.block_on(service.status(wallet))?;
            print_json(&view)?;
            Ok(0)
        }
        LedgerCommand::Verify {
            wallet,
            commitment,
            category,
            proof,
            store,
        } => {
            let engine = ProofVerificationEngine::new(
                client,
                Arc::new(FileProofStore::new(store.clone())),
                VerifierRegistry::mock(),
            );
            let request = VerificationRequest {
                category: (*category).into(),
                holder_identifier: wallet.clone(),
                commitment: commitment.clone(),
                proof: proof.as_deref().map(read_document).transpose()?,
            };
            let outcome = rt.block_on(engine.verify(&request))?;
            print_json(&outcome)?;
            Ok(if outcome.verified { 0 } else { 3 })
        }
    }
}
