//! Workspace inspection and retention
//!
//! Generated projects land under one parent directory, one subdirectory per
//! request plus its zip artifact. These commands show what is there and trim
//! it to the retention limit without running a generation.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use prettytable::row;
use serde::{Deserialize, Serialize};

use codeforge_core::workspace::{
    format_timestamp, list_workspaces, prune_workspaces, WorkspaceEntry,
};

use crate::prelude::{eprintln, println, *};

#[derive(Debug, Parser)]
#[command(name = "workspace")]
#[command(about = "Inspect and prune generated project workspaces")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List workspaces, newest first
    #[clap(name = "list")]
    List(ListOptions),
    /// Remove workspaces beyond the retention limit
    #[clap(name = "prune")]
    Prune(PruneOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Directory that holds generated project workspaces
    #[arg(long, env = "CODEFORGE_WORKSPACE_DIR", default_value = "workspaces")]
    pub workspace_dir: PathBuf,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct PruneOptions {
    /// Directory that holds generated project workspaces
    #[arg(long, env = "CODEFORGE_WORKSPACE_DIR", default_value = "workspaces")]
    pub workspace_dir: PathBuf,

    /// Number of most recent workspaces to keep
    #[arg(long, env = "CODEFORGE_KEEP", default_value = "20")]
    pub keep: usize,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list(options, global).await,
        Commands::Prune(options) => prune(options, global).await,
    }
}

async fn list(options: ListOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Listing workspaces under {}",
            options.workspace_dir.display()
        );
    }

    let entries = list_workspaces(&options.workspace_dir)
        .map_err(|e| eyre!("Failed to list workspaces: {}", e))?;

    if options.json {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "name": entry.name,
                    "files": entry.file_count,
                    "modified": format_timestamp(entry.modified),
                    "archive": entry.has_archive,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&items)
                .map_err(|e| eyre!("Failed to serialize workspaces: {}", e))?
        );
        return Ok(());
    }

    println!("{}", format_workspace_table(&entries));

    Ok(())
}

async fn prune(options: PruneOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!(
            "Pruning workspaces under {} (keeping {})",
            options.workspace_dir.display(),
            options.keep
        );
    }

    let removed = prune_workspaces(&options.workspace_dir, options.keep)
        .map_err(|e| eyre!("Failed to prune workspaces: {}", e))?;

    if removed.is_empty() {
        println!("Nothing to prune.");
        return Ok(());
    }

    for name in &removed {
        println!("{} {}", "Removed".red(), name);
    }

    Ok(())
}

fn format_workspace_table(entries: &[WorkspaceEntry]) -> String {
    if entries.is_empty() {
        return "No workspaces found.".to_string();
    }

    let mut table = new_table();
    table.set_titles(row![
        "NAME".bold(),
        "FILES".bold(),
        "MODIFIED".bold(),
        "ARCHIVE".bold()
    ]);
    for entry in entries {
        let archive = if entry.has_archive { "yes" } else { "no" };
        table.add_row(row![
            entry.name.cyan(),
            entry.file_count,
            format_timestamp(entry.modified),
            archive
        ]);
    }
    table.to_string()
}
