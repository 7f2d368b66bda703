//! Run command: the full multi-round search

use crate::app::AppConfig;
use crate::config::{ConfigLoader, ConfigOverrides};
use crate::execution::{RoundDriver, RunSummary};
use crate::report;
use crate::search::ColoringBfs;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Flags of the `run` command
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub rounds: Option<usize>,
    pub map_tasks: Option<usize>,
    pub reduce_tasks: Option<usize>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_report: bool,
    pub json: bool,
}

impl RunParams {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            rounds: self.rounds,
            map_tasks: self.map_tasks,
            reduce_tasks: self.reduce_tasks,
            input_dir: self.input.clone(),
            output_dir: self.output.clone(),
        }
    }
}

/// Execute the run command
pub async fn run_search_command(params: RunParams, app: &AppConfig) -> Result<()> {
    let config = ConfigLoader::new(&app.working_dir)
        .with_config_file(params.config.clone())
        .load(&params.overrides())
        .await
        .context("Failed to load search configuration")?;
    let report_path = config.report_path();

    let driver = RoundDriver::new(config, Arc::new(ColoringBfs))?;
    let summary = driver.run().await.context("Search run failed")?;

    if !params.no_report {
        report::consolidate(driver.store(), &report_path)
            .await
            .context("Failed to write the consolidated report")?;
    }

    if params.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(())
}

/// Human-readable run summary: one line per round, then the totals
pub fn render_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    for round in &summary.rounds {
        text.push_str(&round.to_string());
        text.push('\n');
    }
    text.push_str(&format!(
        "Finished {} round(s) in {:.2}s",
        summary.rounds.len(),
        summary.duration_secs
    ));
    if let Some(output) = summary.final_output() {
        text.push_str(&format!("; final output in {}", output.display()));
    }
    text.push('\n');
    text
}
