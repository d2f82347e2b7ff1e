use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use premtrack::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for premtrack::AppCommand {
    fn from(cmd: Commands) -> premtrack::AppCommand {
        match cmd {
            Commands::Fetch {
                lookback_days,
                output,
            } => premtrack::AppCommand::Fetch {
                lookback_days,
                output,
            },
            Commands::Show { input } => premtrack::AppCommand::Show { input },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch data, compute premiums and write the artifact
    Fetch {
        /// Days of history to fetch (default from config, two years)
        #[arg(short, long)]
        lookback_days: Option<u32>,

        /// Artifact path (default from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display the summary of an existing artifact
    Show {
        /// Artifact path (default from config)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => premtrack::cli::setup::setup(),
        Some(cmd) => premtrack::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
