//! Consolidated report over every round output
//!
//! The report lists each round directory in round order, followed by that
//! round's canonical records sorted as text, each on its own tab-indented
//! line:
//!
//! ```text
//! output/output-graph-1
//!     0	1,2|5,2|0|BLACK
//!     1	3|1|5|GRAY
//! output/output-graph-2
//!     ...
//! ```

use crate::error::{Error, Result};
use crate::execution::RoundStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Records of one round directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

/// Render sections as report text
///
/// Lines within a section are sorted; sections keep the order given.
pub fn render_report(sections: &[ReportSection]) -> String {
    sections
        .iter()
        .map(|section| {
            let mut lines = section.lines.clone();
            lines.sort();
            format!("{}\n\t{}", section.heading, lines.join("\n\t"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collect every round directory under the store's output directory
pub async fn collect_sections(store: &RoundStore) -> Result<Vec<ReportSection>> {
    let mut sections = Vec::new();
    for (round, dir) in store.round_dirs()? {
        let lines = store.read_round(round).await?;
        debug!("Round {} contributes {} line(s) to the report", round, lines.len());
        sections.push(ReportSection {
            heading: dir.display().to_string(),
            lines,
        });
    }
    Ok(sections)
}

/// Write the consolidated report to `report_path`
///
/// Returns the number of round sections written.
pub async fn consolidate(store: &RoundStore, report_path: &Path) -> Result<usize> {
    let sections = collect_sections(store).await?;
    let text = render_report(&sections);

    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io_at(parent, e))?;
    }
    let temp_path = temp_sibling(report_path);
    fs::write(&temp_path, text)
        .await
        .map_err(|e| Error::io_at(&temp_path, e))?;
    fs::rename(&temp_path, report_path)
        .await
        .map_err(|e| Error::io_at(report_path, e))?;

    info!(
        "Wrote report of {} round(s) to {}",
        sections.len(),
        report_path.display()
    );
    Ok(sections.len())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
