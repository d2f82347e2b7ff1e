pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    /// Fetch, compute and publish a fresh artifact.
    Fetch {
        lookback_days: Option<u32>,
        output: Option<PathBuf>,
    },
    /// Summarize an existing artifact.
    Show { input: Option<PathBuf> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Premium tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Fetch {
            lookback_days,
            output,
        } => cli::fetch::run(&config, lookback_days, output).await,
        AppCommand::Show { input } => cli::show::run(&config, input),
    }
}
