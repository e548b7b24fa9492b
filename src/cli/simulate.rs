//! `simulate`: run the import against an in-memory store.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::prepare_plan;
use crate::cache::ImportRunContext;
use crate::config::ImportConfig;
use crate::execution::{DryRunCreator, ExecuteOptions, execute_plan};

/// Run the import against an in-memory store and print the JSON report.
#[derive(Args)]
pub struct SimulateCommand {
    /// JSON batch file
    #[arg(value_name = "BATCH")]
    pub batch: PathBuf,

    /// Maximum concurrent creations (defaults to the configured value)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub max_parallel: Option<u16>,

    /// Make creation fail for this legacy ID (repeatable)
    #[arg(long = "fail", value_name = "LEGACY_ID")]
    pub fail: Vec<String>,
}

impl SimulateCommand {
    /// Run the command.
    pub async fn execute(&self, config: &ImportConfig) -> Result<()> {
        let plan = prepare_plan(&self.batch, config)?;
        for issue in &plan.issues {
            tracing::warn!("Row {}, column '{}': {}", issue.row, issue.column, issue.message);
        }

        let options = ExecuteOptions {
            max_parallel: self.max_parallel.map_or_else(|| config.max_parallel(), usize::from),
            extractor: config.extractor(),
        };
        let ctx = ImportRunContext::new();
        let creator = DryRunCreator::failing(&self.fail);

        let report = execute_plan(&ctx, &plan.items, &creator, &options).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
