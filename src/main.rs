//! Check Suite - command line entry point
//!
//! Lists and inspects the definitions held by the configured store.

use anyhow::{Context, Result};
use check_suite::store::{self, DefinitionStore};
use check_suite::{Config, TestId};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "check-suite", version, about = "Inspect stored check definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every stored definition as one JSON object per line
    List,
    /// Print one stored definition as pretty JSON
    Show {
        /// Definition identity
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Logs go to stderr; stdout carries command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let store = store::from_config(&config);
    info!(remote = config.remote_url.is_some(), "Store selected");

    let result = match cli.command {
        Command::List => list(store.as_ref()),
        Command::Show { id } => show(store.as_ref(), &id),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}

fn list(store: &dyn DefinitionStore) -> Result<()> {
    for meta in store.list().context("listing definitions")? {
        println!("{}", serde_json::to_string(&meta)?);
    }
    Ok(())
}

fn show(store: &dyn DefinitionStore, id: &str) -> Result<()> {
    let id = TestId::new(id)?;
    let meta = store
        .load(&id)
        .with_context(|| format!("loading definition {}", id))?
        .with_context(|| format!("definition {} not found", id))?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}
