use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod loader;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};

/// Settings for one multi-round search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fixed number of expand/merge rounds
    pub rounds: usize,
    /// Number of input splits, one expansion task each
    pub map_tasks: usize,
    /// Number of merge partitions, one merge task each
    pub reduce_tasks: usize,
    /// Concurrent task limit; defaults to the larger task count
    pub max_parallel: Option<usize>,
    /// Directory holding the round-0 input
    pub input_dir: PathBuf,
    /// Directory holding per-round outputs and the report
    pub output_dir: PathBuf,
    /// Name prefix of per-round output directories
    pub round_prefix: String,
    /// File name of the consolidated report inside `output_dir`
    pub report_file: String,
    /// Attempts per task before a transient failure becomes fatal
    pub max_task_attempts: u32,
    /// Base delay between attempts, doubled on each retry
    pub retry_backoff_ms: u64,
    /// Remove leftover round outputs before a fresh run
    pub clear_stale_outputs: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            map_tasks: 3,
            reduce_tasks: 3,
            max_parallel: None,
            input_dir: PathBuf::from("input-graph"),
            output_dir: PathBuf::from("output"),
            round_prefix: "output-graph".to_string(),
            report_file: "outAll.txt".to_string(),
            max_task_attempts: 3,
            retry_backoff_ms: 50,
            clear_stale_outputs: true,
        }
    }
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub rounds: Option<usize>,
    pub map_tasks: Option<usize>,
    pub reduce_tasks: Option<usize>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl SearchConfig {
    pub fn effective_parallelism(&self) -> usize {
        self.max_parallel
            .unwrap_or_else(|| self.map_tasks.max(self.reduce_tasks))
            .max(1)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    /// Resolve relative directories against `base`
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if self.input_dir.is_relative() {
            self.input_dir = base.join(&self.input_dir);
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        self
    }

    /// Apply `GRAPHSEARCH_*` environment variables
    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides from an arbitrary lookup
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let count = |key: &str, slot: &mut usize| {
            if let Some(value) = lookup(key) {
                match value.trim().parse::<usize>() {
                    Ok(parsed) => *slot = parsed,
                    Err(_) => warn!("Ignoring {}={:?}: not a count", key, value),
                }
            }
        };
        count("GRAPHSEARCH_ROUNDS", &mut self.rounds);
        count("GRAPHSEARCH_MAP_TASKS", &mut self.map_tasks);
        count("GRAPHSEARCH_REDUCE_TASKS", &mut self.reduce_tasks);

        if let Some(dir) = lookup("GRAPHSEARCH_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("GRAPHSEARCH_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(rounds) = overrides.rounds {
            self.rounds = rounds;
        }
        if let Some(map_tasks) = overrides.map_tasks {
            self.map_tasks = map_tasks;
        }
        if let Some(reduce_tasks) = overrides.reduce_tasks {
            self.reduce_tasks = reduce_tasks;
        }
        if let Some(dir) = &overrides.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::Usage(
                "rounds must be at least 1 (pass -i <# of iterations>)".to_string(),
            ));
        }
        if self.map_tasks == 0 {
            return Err(Error::Config("map_tasks must be greater than 0".to_string()));
        }
        if self.reduce_tasks == 0 {
            return Err(Error::Config(
                "reduce_tasks must be greater than 0".to_string(),
            ));
        }
        if self.max_parallel == Some(0) {
            return Err(Error::Config(
                "max_parallel must be greater than 0".to_string(),
            ));
        }
        if self.max_task_attempts == 0 {
            return Err(Error::Config(
                "max_task_attempts must be greater than 0".to_string(),
            ));
        }
        if self.round_prefix.is_empty() {
            return Err(Error::Config("round_prefix must not be empty".to_string()));
        }
        Ok(())
    }
}
