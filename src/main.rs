//! legacy-import CLI entry point
//!
//! Parses arguments, runs the selected command and turns any failure into a
//! user-facing error with suggestions:
//! - `check` - validate a batch file
//! - `plan` - print the creation order
//! - `simulate` - rehearse the import in memory

use anyhow::Result;
use clap::Parser;
use legacy_import::cli;
use legacy_import::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
