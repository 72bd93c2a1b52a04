//! Notespace command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the workspace once.
//! - Dispatch one subcommand against that workspace.

use anyhow::Context;
use clap::Parser;
use notespace_core::{init_logging, AppConfig, FileApp};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "notespace", version, about = "Local page tree workspace")]
struct Cli {
    /// Directory holding pages.json and settings.json.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Act as the workspace owner without signing in. Same as
    /// NOTESPACE_LOCAL_OWNER=true.
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid environment configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if cli.local {
        config.local_owner = true;
    }

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let app = FileApp::open(&config).context("failed to open workspace")?;
    commands::run(&app, cli.command).await
}
