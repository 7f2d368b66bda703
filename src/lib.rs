//! # graphsearch
//!
//! Single-source breadth-first search over a weighted directed graph,
//! computed in synchronous expand/merge rounds over partitioned storage.
//!
//! Every vertex is a [`NodeRecord`](graph::NodeRecord) carrying its
//! adjacency list, its best known distance from the source, and a color:
//! WHITE (undiscovered), GRAY (discovered, not yet expanded), or BLACK
//! (expanded). Each round expands every GRAY vertex into its neighbors and
//! then merges all records of a vertex into one canonical record. After `R`
//! rounds every vertex within `R` hops of the source carries its distance.
//!
//! ## Usage
//!
//! ```bash
//! graphsearch init edges.txt --source 0
//! graphsearch run -i 3 -m 3 -r 3
//! ```
//!
//! ## Modules
//!
//! - `graph` - Node records, the line codec, and the edge-list loader
//! - `search` - The pure expand and merge steps behind the `RoundJob` trait
//! - `execution` - Local substrate: round storage, phases, retry, and the round driver
//! - `report` - Consolidated report over all round outputs
//! - `config` - Search configuration from TOML, environment, and CLI
//! - `app` - Logging, application config, and exit codes
//! - `cli` - Command-line interface
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod graph;
pub mod report;
pub mod search;

pub use error::{Error, Result};
