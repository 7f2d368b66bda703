//! Common test utilities and helpers

#![allow(dead_code)]

use graphsearch::config::SearchConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Initial graph of the four-vertex example: 0 -> 1 (5), 0 -> 2 (2), 1 -> 3 (1)
pub const SCENARIO_GRAPH: &str =
    "0\t1,2|5,2|0|GRAY\n1\t3|1|INF|WHITE\n2\t||INF|WHITE\n3\t||INF|WHITE\n";

/// Edge list producing `SCENARIO_GRAPH` with source 0
pub const SCENARIO_EDGES: &str = "# src dst weight\n0 1 5\n0 2 2\n1 3 1\n";

/// Expected canonical output of rounds 1 to 3 of the example
pub fn scenario_rounds() -> [Vec<&'static str>; 3] {
    [
        vec![
            "0\t1,2|5,2|0|BLACK",
            "1\t3|1|5|GRAY",
            "2\t||2|GRAY",
            "3\t||INF|WHITE",
        ],
        vec![
            "0\t1,2|5,2|0|BLACK",
            "1\t3|1|5|BLACK",
            "2\t||2|BLACK",
            "3\t||6|GRAY",
        ],
        vec![
            "0\t1,2|5,2|0|BLACK",
            "1\t3|1|5|BLACK",
            "2\t||2|BLACK",
            "3\t||6|BLACK",
        ],
    ]
}

/// Write `content` as the round-0 input under `root/input-graph`
pub fn write_input(root: &Path, content: &str) -> PathBuf {
    let input = root.join("input-graph");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("part-00000"), content).unwrap();
    input
}

/// Default configuration rooted at `temp_dir`
pub fn test_config(temp_dir: &TempDir, rounds: usize) -> SearchConfig {
    SearchConfig {
        rounds,
        retry_backoff_ms: 1,
        ..SearchConfig::default()
    }
    .rooted_at(temp_dir.path())
}

/// All non-blank lines of every partition file in `dir`, sorted
pub fn read_sorted_lines(dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        if name.starts_with("part-") && !name.ends_with(".tmp") {
            let content = fs::read_to_string(&path).unwrap();
            lines.extend(
                content
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }
    }
    lines.sort();
    lines
}

/// Output directory of `round` under the default layout
pub fn round_dir(root: &Path, round: usize) -> PathBuf {
    root.join("output").join(format!("output-graph-{round}"))
}
