//! ledger-cli: contract execution and asset validation against a ledger
//!
//! Reads `client.properties` from the working directory (or `--config-dir`)
//! for every command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ledger_client::prelude::*;

/// ledger-cli: run ledger contracts and prove asset integrity
#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "Execute registered contracts and validate assets on a ledger")]
struct Args {
    /// Directory holding client.properties (defaults to the working directory)
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Run against a process-local ledger instead of the configured server
    #[arg(long, global = true)]
    in_memory: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "error")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a contract registered under the configured holder
    Execute {
        /// Logical contract name
        contract_name: String,

        /// Contract argument as a JSON object
        #[arg(short, long, value_parser = parse_json)]
        parameters: Option<Value>,
    },

    /// Validate that an asset's history is untampered
    Validate {
        /// Asset id, without the holder prefix
        id: String,
    },

    /// Print the uppercase hex digest of a name
    Hash {
        /// Name to digest
        name: String,

        /// Hash algorithm
        #[arg(short, long, default_value = "MD5")]
        algorithm: String,
    },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter: {level}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let location = match &args.config_dir {
        Some(dir) => ConfigLocation::Dir(dir.clone()),
        None => ConfigLocation::CurrentDir,
    };
    debug!(?location, in_memory = args.in_memory, "starting");

    let success = if args.in_memory {
        run(InMemoryLedger::dry_run(), location, args.command)
    } else {
        run(JsonRpcConnector, location, args.command)
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run one command; returns whether it succeeded.
fn run<C: LedgerConnector>(connector: C, location: ConfigLocation, command: Command) -> bool {
    match command {
        Command::Execute {
            contract_name,
            parameters,
        } => {
            let mut executor = LedgerExecutor::with_location(connector, location, Console::stdio());
            executor
                .execute_contract(&contract_name, parameters)
                .is_success()
        }
        Command::Validate { id } => {
            let mut executor = LedgerExecutor::with_location(connector, location, Console::stdio());
            executor.validate_asset(&id).is_success()
        }
        Command::Hash { name, algorithm } => {
            let mut console = Console::stdio();
            match hash_hex_with(&algorithm, Some(name.as_str())) {
                Ok(Some(hashed)) => {
                    console.say(&hashed);
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    console.report(&e.to_string());
                    false
                }
            }
        }
    }
}
