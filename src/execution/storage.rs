//! Per-round partitioned storage on the local filesystem
//!
//! Layout:
//!
//! ```text
//! <input_dir>/*                              round 0 input (any file name)
//! <output_dir>/<prefix>-<r>/part-00000 ...   output of round r-1, input of round r
//! <output_dir>/<report_file>                 consolidated report
//! ```
//!
//! Partition files are written next to their final location and renamed into
//! place, so a partition is either absent or complete.

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

/// File name prefix of partition files
pub const PARTITION_PREFIX: &str = "part-";

const TEMP_SUFFIX: &str = ".tmp";

/// Resolves and accesses the storage locations of every round
#[derive(Debug, Clone)]
pub struct RoundStore {
    input_dir: PathBuf,
    output_dir: PathBuf,
    round_prefix: String,
}

impl RoundStore {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        round_prefix: impl Into<String>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            round_prefix: round_prefix.into(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            config.input_dir.clone(),
            config.output_dir.clone(),
            config.round_prefix.clone(),
        )
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory holding the input of `round`
    pub fn round_dir(&self, round: usize) -> PathBuf {
        if round == 0 {
            self.input_dir.clone()
        } else {
            self.output_dir
                .join(format!("{}-{}", self.round_prefix, round))
        }
    }

    pub fn partition_path(&self, round: usize, partition: usize) -> PathBuf {
        self.round_dir(round).join(partition_file_name(partition))
    }

    /// Every non-blank line of every data file of `round`, in file-name order
    pub async fn read_round(&self, round: usize) -> Result<Vec<String>> {
        let dir = self.round_dir(round);
        let files = self.data_files(round)?;
        debug!(
            "Reading round {} input from {} file(s) in {}",
            round,
            files.len(),
            dir.display()
        );

        let mut lines = Vec::new();
        for file in files {
            let content = fs::read_to_string(&file)
                .await
                .map_err(|e| Error::io_at(&file, e))?;
            lines.extend(
                content
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string),
            );
        }
        Ok(lines)
    }

    /// Data files of a round
    ///
    /// Round 0 accepts any regular file except names starting with `_` or
    /// `.`; later rounds only contain partition files.
    pub fn data_files(&self, round: usize) -> Result<Vec<PathBuf>> {
        let dir = self.round_dir(round);
        if !dir.is_dir() {
            return Err(Error::io_at(
                &dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("round {round} input directory does not exist"),
                ),
            ));
        }
        list_files(&dir, |name| {
            if round == 0 {
                !name.starts_with('_') && !name.starts_with('.') && !name.ends_with(TEMP_SUFFIX)
            } else {
                is_partition_file(name)
            }
        })
    }

    /// Create an empty output directory for `round`, dropping anything a
    /// previous attempt left there
    pub async fn prepare_round(&self, round: usize) -> Result<()> {
        let dir = self.round_dir(round);
        if round == 0 {
            return Err(Error::Internal(
                "round 0 is input only and cannot be rewritten".to_string(),
            ));
        }
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| Error::io_at(&dir, e))?;
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io_at(&dir, e))?;
        Ok(())
    }

    /// Write one partition of `round` atomically
    pub async fn write_partition(
        &self,
        round: usize,
        partition: usize,
        lines: &[String],
    ) -> Result<PathBuf> {
        let path = self.partition_path(round, partition);
        let temp_path = path.with_file_name(format!(
            "{}{}",
            partition_file_name(partition),
            TEMP_SUFFIX
        ));

        let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }

        fs::write(&temp_path, content)
            .await
            .map_err(|e| Error::io_at(&temp_path, e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::io_at(&path, e))?;
        Ok(path)
    }

    /// Round output directories that exist, ordered by round number
    pub fn round_dirs(&self) -> Result<Vec<(usize, PathBuf)>> {
        if !self.output_dir.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}-", self.round_prefix);
        let mut dirs = Vec::new();
        for entry in WalkDir::new(&self.output_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if let Some(round) = name
                .strip_prefix(&prefix)
                .and_then(|suffix| suffix.parse::<usize>().ok())
            {
                dirs.push((round, entry.path().to_path_buf()));
            }
        }
        dirs.sort_by_key(|(round, _)| *round);
        Ok(dirs)
    }

    /// Remove round outputs and the report left by an earlier run
    ///
    /// Only called at the start of a fresh run; a failed run keeps its
    /// partial outputs for inspection.
    pub async fn clear_stale_outputs(&self, report_file: &str) -> Result<usize> {
        let mut removed = 0;
        for (_, dir) in self.round_dirs()? {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| Error::io_at(&dir, e))?;
            removed += 1;
        }

        let report = self.output_dir.join(report_file);
        if report.is_file() {
            fs::remove_file(&report)
                .await
                .map_err(|e| Error::io_at(&report, e))?;
        }

        if removed > 0 {
            info!(
                "Removed {} stale round output(s) from {}",
                removed,
                self.output_dir.display()
            );
        }
        Ok(removed)
    }
}

pub fn partition_file_name(partition: usize) -> String {
    format!("{PARTITION_PREFIX}{partition:05}")
}

fn is_partition_file(name: &str) -> bool {
    name.starts_with(PARTITION_PREFIX) && !name.ends_with(TEMP_SUFFIX)
}

/// Regular files directly inside `dir` whose names pass `keep`, sorted by name
pub fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() && keep(&entry.file_name().to_string_lossy()) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}
