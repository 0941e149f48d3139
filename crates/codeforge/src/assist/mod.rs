//! Natural-language project generation
//!
//! `assist` drives the whole pipeline: build the generation prompt, make one
//! gateway call, parse the strict JSON contract, then materialize and zip the
//! files while a second model pass reviews them. The review is advisory and
//! never fails the request.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use codeforge_core::archive::{archive_name, archive_project};
use codeforge_core::contract::parse_generation_output;
use codeforge_core::manifest::ProjectManifest;
use codeforge_core::materialize::materialize_project;
use codeforge_core::prompt::{build_generation_prompt, build_review_prompt};
use codeforge_core::workspace::{prune_workspaces, slugify, workspace_dir_name};

use crate::gateway::{CompletionParams, Gateway, GroqConfig};
use crate::prelude::{eprintln, println, *};

/// System prompt for the generation call
pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are a coding assistant that generates complete, production-ready projects.";

/// System prompt for the advisory review call
pub const REVIEW_SYSTEM_PROMPT: &str =
    "You are a senior software engineer specializing in debugging code.";

/// Sampling parameters for the generation call
pub const GENERATION_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.3,
    max_completion_tokens: 1024,
};

/// Sampling parameters for the review call
pub const REVIEW_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.5,
    max_completion_tokens: 512,
};

#[derive(Debug, Parser)]
#[command(name = "assist")]
#[command(about = "Generate a complete project from a natural-language instruction")]
pub struct App {
    #[clap(flatten)]
    pub options: AssistOptions,
}

#[derive(Debug, Parser, Serialize, Deserialize, Clone)]
pub struct AssistOptions {
    /// Natural-language instruction describing the project to generate
    pub instruction: String,

    /// Groq API key (overrides the GROQ_API_KEY environment variable)
    #[clap(long)]
    pub api_key: Option<String>,

    /// Groq API base URL (overrides the GROQ_BASE_URL environment variable)
    #[clap(long)]
    pub base_url: Option<String>,

    /// Model for generation and review (overrides the CODEFORGE_MODEL environment variable)
    #[clap(long)]
    pub model: Option<String>,

    /// Directory that holds generated project workspaces
    #[clap(long, env = "CODEFORGE_WORKSPACE_DIR", default_value = "workspaces")]
    pub workspace_dir: PathBuf,

    /// Number of most recent workspaces to keep when pruning
    #[clap(long, env = "CODEFORGE_KEEP", default_value = "20")]
    pub keep: usize,

    /// Output the result as JSON
    #[clap(long)]
    pub json: bool,
}

/// Inputs for a single generation request
#[derive(Debug, Clone)]
pub struct AssistParams {
    pub instruction: String,
    pub workspace_dir: PathBuf,
    pub keep: usize,
}

/// Result of a completed generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistOutput {
    pub files: ProjectManifest,
    pub preview: String,
    pub debug: String,
    pub zip_file: String,
}

fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(spinner) = spinner {
        spinner.set_message(msg.into());
    }
}

/// Run the full generation pipeline and return the materialized output.
///
/// The generation call and contract parse are fatal on failure. Once a valid
/// manifest exists, the advisory review runs concurrently with the write and
/// zip work. Review failures are folded into the returned debug text instead
/// of failing the request, and old workspaces beyond the retention limit are
/// swept before returning.
pub async fn assist_data(
    gateway: &Gateway,
    params: AssistParams,
    spinner: Option<&ProgressBar>,
) -> Result<AssistOutput, Error> {
    let AssistParams {
        instruction,
        workspace_dir,
        keep,
    } = params;

    set_spinner_msg(spinner, "Generating project...");
    let prompt = build_generation_prompt(&instruction);
    let raw = gateway
        .complete(GENERATION_SYSTEM_PROMPT, &prompt, GENERATION_PARAMS)
        .await
        .map_err(|e| Error::Generation(e.to_string()))?;

    let output = parse_generation_output(&raw).map_err(|e| Error::Generation(e.to_string()))?;
    let manifest = ProjectManifest::from_model_files(&output.files)
        .map_err(|e| Error::Materialization(e.to_string()))?;

    let request_id = uuid::Uuid::new_v4().simple().to_string();
    let root_name = workspace_dir_name(&slugify(&instruction), &request_id[..8]);
    let root = workspace_dir.join(&root_name);

    set_spinner_msg(spinner, "Writing and reviewing project files...");
    let (debug, written) = tokio::join!(
        review_data(gateway, &manifest),
        materialize_and_archive(root.clone(), manifest.clone())
    );

    let zip_file = match written {
        Ok(zip_file) => zip_file,
        Err(e) => {
            cleanup_workspace(&workspace_dir, &root_name).await;
            return Err(e);
        }
    };

    set_spinner_msg(spinner, "Pruning old workspaces...");
    // A retention of zero would sweep the root this request just wrote.
    let keep = keep.max(1);
    let parent = workspace_dir.clone();
    match tokio::task::spawn_blocking(move || prune_workspaces(&parent, keep)).await {
        Ok(Ok(removed)) => {
            for name in removed {
                log::debug!("Pruned workspace {}", name);
            }
        }
        Ok(Err(e)) => log::warn!("Workspace pruning failed: {}", e),
        Err(e) => log::warn!("Workspace pruning task failed: {}", e),
    }

    Ok(AssistOutput {
        files: manifest,
        preview: output.preview,
        debug,
        zip_file,
    })
}

/// Advisory review pass. Failures degrade into the returned text.
pub async fn review_data(gateway: &Gateway, manifest: &ProjectManifest) -> String {
    let prompt = build_review_prompt(manifest);
    match gateway
        .complete(REVIEW_SYSTEM_PROMPT, &prompt, REVIEW_PARAMS)
        .await
    {
        Ok(analysis) => analysis.trim().to_string(),
        Err(e) => format!("Debugging pass failed: {}", e),
    }
}

/// Write the manifest under `root` and zip it, both on the blocking pool.
async fn materialize_and_archive(
    root: PathBuf,
    manifest: ProjectManifest,
) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || {
        materialize_project(&root, &manifest)
            .map_err(|e| Error::Materialization(e.to_string()))?;
        archive_project(&root).map_err(|e| Error::Archiving(e.to_string()))
    })
    .await
    .map_err(|e| Error::Materialization(e.to_string()))?
}

/// Remove a partially written workspace and its archive, logging failures.
async fn cleanup_workspace(parent: &Path, root_name: &str) {
    let root = parent.join(root_name);
    let archive = parent.join(archive_name(root_name));
    let result = tokio::task::spawn_blocking(move || {
        if root.exists() {
            std::fs::remove_dir_all(&root)?;
        }
        if archive.exists() {
            std::fs::remove_file(&archive)?;
        }
        Ok::<(), std::io::Error>(())
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Failed to clean up workspace {}: {}", root_name, e),
        Err(e) => log::warn!("Workspace cleanup task failed: {}", e),
    }
}

fn format_assist_text(output: &AssistOutput) -> String {
    use colored::Colorize;

    let mut text = String::new();

    text.push_str(&format!("{}\n", "== Generated Project ==".bold()));
    for (path, content) in output.files.files() {
        text.push_str(&format!("  {} ({} bytes)\n", path.cyan(), content.len()));
    }

    text.push_str(&format!("\n{}\n", "== Preview ==".bold()));
    text.push_str(&format!("{}\n", output.preview));

    text.push_str(&format!("\n{}\n", "== Debug Analysis ==".bold()));
    text.push_str(&format!("{}\n", output.debug));

    text.push_str(&format!("\n{}\n", "== Archive ==".bold()));
    text.push_str(&format!("  {}\n", output.zip_file.green()));

    text
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let options = app.options;

    if global.verbose {
        eprintln!("Running assist with options: {:?}", options);
    }

    let config = GroqConfig::from_env().with_overrides(
        options.base_url.clone(),
        options.api_key.clone(),
        options.model.clone(),
    );
    let gateway = Gateway::new(&config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Generating project...");

    let params = AssistParams {
        instruction: options.instruction.clone(),
        workspace_dir: options.workspace_dir.clone(),
        keep: options.keep,
    };

    let result = assist_data(&gateway, params, Some(&spinner)).await;
    spinner.finish_and_clear();
    let output = result?;

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output)
                .map_err(|e| eyre!("Failed to serialize output: {}", e))?
        );
        return Ok(());
    }

    println!("{}", format_assist_text(&output));

    Ok(())
}
