//! # kyc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kyc_cli::hash::{run_hash, HashArgs};
use kyc_cli::ledger::{run_ledger, LedgerArgs};
use kyc_cli::proofs::{run_proofs, ProofsArgs};
use kyc_cli::prove::{run_prove, ProveArgs};

/// Operator tooling for the KYC commitment ledger.
#[derive(Parser, Debug)]
#[command(name = "kyc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Subject keys and credential commitments.
    Hash(HashArgs),

    /// Build a mock predicate proof.
    Prove(ProveArgs),

    /// Proof store maintenance.
    Proofs(ProofsArgs),

    /// Read the ledger through the gateway.
    Ledger(LedgerArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Hash(args) => run_hash(&args),
        Commands::Prove(args) => run_prove(&args),
        Commands::Proofs(args) => run_proofs(&args),
        Commands::Ledger(args) => run_ledger(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
