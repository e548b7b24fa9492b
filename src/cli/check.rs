//! `check`: validate a batch without creating anything.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{prepare_plan, print_issues};
use crate::config::ImportConfig;
use crate::execution::creation_waves;

/// Validate a batch and report whether it can be imported.
#[derive(Args)]
pub struct CheckCommand {
    /// JSON batch file
    #[arg(value_name = "BATCH")]
    pub batch: PathBuf,

    /// Fail when any cell could not be converted
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// Run the command.
    pub fn execute(&self, config: &ImportConfig) -> Result<()> {
        let plan = prepare_plan(&self.batch, config)?;
        let legacy = plan.items.iter().filter(|item| item.has_legacy_id()).count();
        let waves = creation_waves(&plan.items).len();

        print_issues(&plan.issues);
        if self.strict && !plan.issues.is_empty() {
            anyhow::bail!("{} cell(s) could not be converted", plan.issues.len());
        }

        println!(
            "{} {} is valid: {} items ({} with legacy IDs) in {} waves",
            "✓".green(),
            self.batch.display(),
            plan.items.len(),
            legacy,
            waves
        );
        Ok(())
    }
}
