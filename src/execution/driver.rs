//! Round driver
//!
//! Runs a fixed number of expand/merge rounds. Round `r` reads the canonical
//! output of round `r - 1` (round 0 is the initial graph) and writes its own
//! canonical output; nothing of a round is read before the previous round's
//! merge phase has returned. There is no convergence check: a run always
//! performs exactly the configured number of rounds.

use super::phases::{
    ColorCounts, ExpandPhaseExecutor, MergePhaseExecutor, PhaseExecutor, PhaseResult,
    RoundContext,
};
use super::retry::RetryPolicy;
use super::storage::RoundStore;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::search::RoundJob;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What one round did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: usize,
    pub input_records: usize,
    pub expanded_records: usize,
    /// Canonical records written, one per vertex
    pub vertices: usize,
    pub colors: ColorCounts,
    pub retries: u32,
    pub duration_secs: f64,
    pub output_dir: PathBuf,
}

impl std::fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "round {}: {} input, {} expanded, {} vertices ({}) in {:.2}s",
            self.round,
            self.input_records,
            self.expanded_records,
            self.vertices,
            self.colors,
            self.duration_secs
        )?;
        if self.retries > 0 {
            write!(f, ", {} retried task attempt(s)", self.retries)?;
        }
        Ok(())
    }
}

/// What a whole run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub job: String,
    pub rounds: Vec<RoundSummary>,
    pub duration_secs: f64,
}

impl RunSummary {
    /// Output directory of the last round, holding the final result
    pub fn final_output(&self) -> Option<&PathBuf> {
        self.rounds.last().map(|round| &round.output_dir)
    }
}

pub struct RoundDriver {
    config: SearchConfig,
    job: Arc<dyn RoundJob>,
    store: RoundStore,
    retry: RetryPolicy,
}

impl RoundDriver {
    /// Create a driver for `job`; fails if `config` is invalid
    pub fn new(config: SearchConfig, job: Arc<dyn RoundJob>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: RoundStore::from_config(&config),
            retry: RetryPolicy::from_config(&config),
            config,
            job,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn store(&self) -> &RoundStore {
        &self.store
    }

    /// Run every round from the initial graph
    ///
    /// A failure aborts the run. Outputs of rounds that already completed
    /// stay in place.
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        info!(
            "Starting {} for {} round(s): {} map task(s), {} reduce task(s), parallelism {}",
            self.job.name(),
            self.config.rounds,
            self.config.map_tasks,
            self.config.reduce_tasks,
            self.config.effective_parallelism()
        );

        if self.config.clear_stale_outputs {
            self.store
                .clear_stale_outputs(&self.config.report_file)
                .await?;
        }

        let mut rounds = Vec::with_capacity(self.config.rounds);
        for round in 1..=self.config.rounds {
            let summary = self.run_round(round).await?;
            info!("{}", summary);
            rounds.push(summary);
        }

        let summary = RunSummary {
            job: self.job.name().to_string(),
            rounds,
            duration_secs: start.elapsed().as_secs_f64(),
        };
        info!(
            "Completed {} round(s) in {:.2}s",
            summary.rounds.len(),
            summary.duration_secs
        );
        Ok(summary)
    }

    /// Run one expand/merge round
    pub async fn run_round(&self, round: usize) -> Result<RoundSummary> {
        let start = Instant::now();
        let mut context = RoundContext::new(
            round,
            self.store.clone(),
            self.retry,
            self.config.effective_parallelism(),
        );

        let expand = ExpandPhaseExecutor::new(
            self.job.clone(),
            self.config.map_tasks,
            self.config.reduce_tasks,
        );
        let merge = MergePhaseExecutor::new(self.job.clone(), self.config.reduce_tasks);

        let expanded = self.execute_phase(&expand, &mut context).await?;
        let merged = self.execute_phase(&merge, &mut context).await?;

        Ok(RoundSummary {
            round,
            input_records: expanded.metrics.records_in,
            expanded_records: expanded.metrics.records_out,
            vertices: merged.metrics.records_out,
            colors: context.color_counts.unwrap_or_default(),
            retries: expanded.metrics.retries + merged.metrics.retries,
            duration_secs: start.elapsed().as_secs_f64(),
            output_dir: self.store.round_dir(round),
        })
    }

    async fn execute_phase(
        &self,
        executor: &dyn PhaseExecutor,
        context: &mut RoundContext,
    ) -> Result<PhaseResult> {
        debug!(
            "Starting {} phase of round {}",
            executor.phase_type(),
            context.round
        );
        executor.validate_context(context)?;
        let result = executor.execute(context).await?;
        debug!(
            "{} phase of round {} finished: {} task(s), {} -> {} record(s) in {:.3}s",
            result.phase_type,
            result.round,
            result.metrics.tasks,
            result.metrics.records_in,
            result.metrics.records_out,
            result.metrics.duration_secs
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::search::ColoringBfs;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir, rounds: usize) -> SearchConfig {
        SearchConfig {
            rounds,
            ..SearchConfig::default()
        }
        .rooted_at(temp_dir.path())
    }

    fn write_input(temp_dir: &TempDir, content: &str) {
        let input = temp_dir.path().join("input-graph");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("part-00000"), content).unwrap();
    }

    #[test]
    fn test_new_validates_config() {
        let temp_dir = TempDir::new().unwrap();
        let result = RoundDriver::new(config(&temp_dir, 0), Arc::new(ColoringBfs));
        assert!(matches!(result, Err(Error::Usage(_))));
    }

    #[test]
    fn test_round_summary_display() {
        let summary = RoundSummary {
            round: 2,
            input_records: 4,
            expanded_records: 6,
            vertices: 4,
            colors: ColorCounts {
                white: 0,
                gray: 1,
                black: 3,
            },
            retries: 0,
            duration_secs: 0.5,
            output_dir: PathBuf::from("output/output-graph-2"),
        };
        assert_eq!(
            summary.to_string(),
            "round 2: 4 input, 6 expanded, 4 vertices (WHITE 0, GRAY 1, BLACK 3) in 0.50s"
        );
    }

    #[tokio::test]
    async fn test_run_counts_colors_per_round() {
        let temp_dir = TempDir::new().unwrap();
        write_input(
            &temp_dir,
            "0\t1,2|5,2|0|GRAY\n1\t3|1|INF|WHITE\n2\t||INF|WHITE\n3\t||INF|WHITE\n",
        );

        let driver = RoundDriver::new(config(&temp_dir, 3), Arc::new(ColoringBfs)).unwrap();
        let summary = driver.run().await.unwrap();

        let colors: Vec<(usize, usize, usize)> = summary
            .rounds
            .iter()
            .map(|r| (r.colors.white, r.colors.gray, r.colors.black))
            .collect();
        assert_eq!(colors, vec![(1, 2, 1), (0, 1, 3), (0, 0, 4)]);
        assert_eq!(summary.rounds[0].expanded_records, 6);
        assert_eq!(
            summary.final_output(),
            Some(&temp_dir.path().join("output/output-graph-3"))
        );
    }

    #[tokio::test]
    async fn test_fresh_run_clears_stale_rounds() {
        let temp_dir = TempDir::new().unwrap();
        write_input(&temp_dir, "0\t||0|GRAY\n");
        let stale = temp_dir.path().join("output/output-graph-9");
        std::fs::create_dir_all(&stale).unwrap();

        let driver = RoundDriver::new(config(&temp_dir, 1), Arc::new(ColoringBfs)).unwrap();
        driver.run().await.unwrap();

        assert!(!stale.exists());
        let rounds: Vec<usize> = driver
            .store()
            .round_dirs()
            .unwrap()
            .into_iter()
            .map(|(round, _)| round)
            .collect();
        assert_eq!(rounds, vec![1]);
    }
}
