#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod assist;
mod chat;
mod error;
mod gateway;
mod prelude;
mod serve;
mod workspace;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate complete software projects from natural-language instructions"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "CODEFORGE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate a project from an instruction and package it for download
    Assist(crate::assist::App),

    /// Single-turn chat with the model
    Chat(crate::chat::App),

    /// Run the HTTP generation service
    Serve(crate::serve::App),

    /// Inspect and prune materialized workspaces
    Workspace(crate::workspace::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Assist(sub_app) => crate::assist::run(sub_app, app.global).await,
        SubCommands::Chat(sub_app) => crate::chat::run(sub_app, app.global).await,
        SubCommands::Serve(sub_app) => crate::serve::run(sub_app, app.global).await,
        SubCommands::Workspace(sub_app) => crate::workspace::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
