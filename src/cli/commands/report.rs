//! Report command: consolidate existing round outputs

use crate::app::AppConfig;
use crate::config::{ConfigLoader, ConfigOverrides};
use crate::execution::RoundStore;
use crate::report;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Execute the report command
pub async fn run_report_command(
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    app: &AppConfig,
) -> Result<()> {
    let config = ConfigLoader::new(&app.working_dir)
        .with_config_file(config)
        .load(&ConfigOverrides {
            output_dir: output,
            ..ConfigOverrides::default()
        })
        .await
        .context("Failed to load search configuration")?;

    let store = RoundStore::from_config(&config);
    let report_path = config.report_path();
    let rounds = report::consolidate(&store, &report_path)
        .await
        .context("Failed to write the consolidated report")?;

    println!(
        "Wrote report of {} round(s) to {}",
        rounds,
        report_path.display()
    );
    Ok(())
}
