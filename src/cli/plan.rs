//! `plan`: print the creation order of a batch.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{prepare_plan, print_issues};
use crate::config::ImportConfig;
use crate::execution::creation_waves;
use crate::models::ImportItem;
use crate::resolver::DependencyGraph;

/// Print the creation order of a batch.
#[derive(Args)]
pub struct PlanCommand {
    /// JSON batch file
    #[arg(value_name = "BATCH")]
    pub batch: PathBuf,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Also print the parent hierarchy as a tree (text format only)
    #[arg(long)]
    pub tree: bool,
}

/// Output format for `plan`.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable list.
    Text,
    /// JSON document.
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanEntry<'a> {
    position: usize,
    wave: usize,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legacy_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legacy_parent_id: Option<&'a str>,
    dependencies: Vec<&'a str>,
}

#[derive(Serialize)]
struct PlanDocument<'a> {
    waves: usize,
    items: Vec<PlanEntry<'a>>,
}

impl PlanCommand {
    /// Run the command.
    pub fn execute(&self, config: &ImportConfig) -> Result<()> {
        let plan = prepare_plan(&self.batch, config)?;
        let waves = creation_waves(&plan.items);

        let mut wave_of = vec![0; plan.items.len()];
        for (wave, indices) in waves.iter().enumerate() {
            for &index in indices {
                wave_of[index] = wave;
            }
        }

        let entries: Vec<PlanEntry<'_>> = plan
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| entry(index, wave_of[index], item))
            .collect();

        match self.format {
            OutputFormat::Json => {
                let document = PlanDocument {
                    waves: waves.len(),
                    items: entries,
                };
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
            OutputFormat::Text => {
                print_issues(&plan.issues);
                println!(
                    "{} ({} items, {} waves)",
                    "Creation plan".bold(),
                    plan.items.len(),
                    waves.len()
                );
                for entry in &entries {
                    println!("{}", format_entry(entry));
                }

                if self.tree {
                    println!("\n{}", "Hierarchy".bold());
                    print!("{}", DependencyGraph::build(&plan.items).to_tree_string(&plan.items));
                }
            }
        }

        Ok(())
    }
}

fn entry(position: usize, wave: usize, item: &ImportItem) -> PlanEntry<'_> {
    PlanEntry {
        position: position + 1,
        wave,
        name: &item.name,
        row: item.row,
        legacy_id: item.legacy_id.as_deref(),
        legacy_parent_id: item.legacy_parent_id.as_deref(),
        dependencies: item.dependencies.iter().map(String::as_str).collect(),
    }
}

fn format_entry(entry: &PlanEntry<'_>) -> String {
    let mut line = format!("{:>4}. [wave {}] {}", entry.position, entry.wave, entry.name);
    if let Some(legacy_id) = entry.legacy_id {
        line.push_str(&format!(" ({legacy_id})"));
    }
    if let Some(parent) = entry.legacy_parent_id {
        line.push_str(&format!(" parent: {parent}"));
    }
    if !entry.dependencies.is_empty() {
        line.push_str(&format!(" needs: {}", entry.dependencies.join(", ")));
    }
    line
}
