use crate::core::Artifact;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Prints the summary of a previously published artifact.
pub fn run(config: &AppConfig, input: Option<PathBuf>) -> Result<()> {
    let path = input.unwrap_or_else(|| config.output_path.clone());
    let artifact = Artifact::load(&path)
        .with_context(|| format!("Failed to read artifact: {}", path.display()))?;

    println!("{}", artifact.display_as_table());
    Ok(())
}
