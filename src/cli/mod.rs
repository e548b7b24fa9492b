//! Command-line interface for legacy-import.
//!
//! Every command reads a JSON batch file, prepares it into items with the
//! active [`ImportConfig`], and validates and orders it:
//!
//! - `check` - report whether the batch can be imported
//! - `plan` - print the creation order with waves and dependencies
//! - `simulate` - run the whole import against an in-memory store
//!
//! # Global Options
//!
//! - `-v, --verbose`: debug logging
//! - `-q, --quiet`: errors only
//! - `-c, --config <PATH>`: configuration file (see [`crate::config`])
//!
//! Logs go to stderr; command output goes to stdout so JSON output can be piped.

mod check;
mod common;
mod plan;
mod simulate;

pub use check::CheckCommand;
pub use common::{PreparedPlan, prepare_plan};
pub use plan::{OutputFormat, PlanCommand};
pub use simulate::SimulateCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ImportConfig;

/// Top-level command line.
#[derive(Parser)]
#[command(
    name = "legacy-import",
    about = "Validate and order import batches that reference rows by legacy ID",
    version,
    long_about = "legacy-import checks spreadsheet-style import batches for duplicate and dangling \
                  legacy IDs, orders them so every parent and referenced item is created first, \
                  and rehearses the import against an in-memory content store."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    ///
    /// Overrides `LEGACY_IMPORT_CONFIG` and `~/.legacy-import/config.toml`.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a batch and report whether it can be imported
    Check(CheckCommand),
    /// Print the creation order of a batch
    Plan(PlanCommand),
    /// Run the import against an in-memory store
    Simulate(SimulateCommand),
}

impl Cli {
    /// Set up logging, load configuration and run the selected command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let config = ImportConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(&config),
            Commands::Plan(cmd) => cmd.execute(&config),
            Commands::Simulate(cmd) => cmd.execute(&config).await,
        }
    }

    /// Log filter for the verbosity flags. `RUST_LOG` wins when set.
    fn log_filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        let level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };
        EnvFilter::new(level)
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
