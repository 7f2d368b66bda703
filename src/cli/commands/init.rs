//! Init command: build the round-0 graph from an edge list

use crate::app::AppConfig;
use crate::config::{ConfigLoader, ConfigOverrides};
use crate::error::Error;
use crate::execution::RoundStore;
use crate::graph::{initial_records, parse_edge_list, serialize, NodeId};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Execute the init command
pub async fn run_init_command(
    edges: PathBuf,
    source: NodeId,
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    app: &AppConfig,
) -> Result<()> {
    let config = ConfigLoader::new(&app.working_dir)
        .with_config_file(config)
        .load(&ConfigOverrides {
            input_dir: input,
            ..ConfigOverrides::default()
        })
        .await
        .context("Failed to load search configuration")?;

    let edges_path = app.working_dir.join(edges);
    let content = fs::read_to_string(&edges_path)
        .await
        .map_err(|e| Error::io_at(&edges_path, e))?;
    let edge_list = parse_edge_list(&content).map_err(Error::from)?;
    let records = initial_records(&edge_list, source);
    info!(
        "Loaded {} edge(s) over {} vertices from {}",
        edge_list.len(),
        records.len(),
        edges_path.display()
    );

    fs::create_dir_all(&config.input_dir)
        .await
        .map_err(|e| Error::io_at(&config.input_dir, e))?;
    let lines: Vec<String> = records.iter().map(serialize).collect();
    let store = RoundStore::from_config(&config);
    let path = store.write_partition(0, 0, &lines).await?;

    println!(
        "Wrote {} vertex record(s) to {} (source {})",
        lines.len(),
        path.display(),
        source
    );
    Ok(())
}
