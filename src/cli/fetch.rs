use super::{summary, ui};
use crate::core::config::AppConfig;
use crate::core::{PipelineOptions, run_and_publish};
use crate::providers;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Fetches fresh data, publishes the artifact and prints its summary.
pub async fn run(
    config: &AppConfig,
    lookback_days: Option<u32>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut options = PipelineOptions::from(config);
    if let Some(days) = lookback_days {
        options.lookback_days = days;
    }
    let output = output.unwrap_or_else(|| config.output_path.clone());
    info!(
        ticker = %config.instrument.ticker,
        scheme_code = config.instrument.scheme_code,
        lookback_days = options.lookback_days,
        "Updating premium data"
    );

    let sources = providers::sources_from_config(config)?;

    let spinner = ui::new_spinner("Fetching prices, NAVs and USD/INR rates...");
    let result = run_and_publish(&sources, &options, &output).await;
    spinner.finish_and_clear();

    let run = result.with_context(|| {
        format!(
            "Premium update failed, {} left unchanged",
            output.display()
        )
    })?;

    println!("{}", run.artifact.display_as_table());
    if !run.partial.is_empty() {
        println!("\n{}", summary::display_partial_data(&run.partial));
    }
    println!(
        "\nSaved {} data points to {}",
        run.artifact.data_points,
        output.display()
    );
    Ok(())
}
