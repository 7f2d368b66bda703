//! CLI argument structures
//!
//! This module defines the command-line interface of graphsearch: the main
//! CLI structure and all subcommand definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Breadth-first search over a weighted graph in expand/merge rounds
#[derive(Parser)]
#[command(name = "graphsearch")]
#[command(about = "graphsearch - Single-source graph search in expand/merge rounds", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the search for a fixed number of rounds
    #[command(name = "run")]
    Run {
        /// Number of expand/merge rounds (# of iterations)
        #[arg(short = 'i', long, value_name = "ROUNDS")]
        rounds: Option<usize>,

        /// Number of expansion tasks (input splits)
        #[arg(short = 'm', long, value_name = "MAP_TASKS")]
        map_tasks: Option<usize>,

        /// Number of merge tasks (output partitions)
        #[arg(short = 'r', long, value_name = "REDUCE_TASKS")]
        reduce_tasks: Option<usize>,

        /// Directory holding the initial graph
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,

        /// Directory receiving per-round outputs and the report
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Configuration file (defaults to graphsearch.toml when present)
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip writing the consolidated report
        #[arg(long)]
        no_report: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the initial graph from an edge list
    #[command(name = "init")]
    Init {
        /// Edge list file: one `<src> <dst> [<weight>]` per line
        edges: PathBuf,

        /// Vertex the search starts from
        #[arg(short = 's', long, value_name = "ID")]
        source: u64,

        /// Directory to write the initial graph to
        #[arg(long, value_name = "DIR")]
        input: Option<PathBuf>,

        /// Configuration file (defaults to graphsearch.toml when present)
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Consolidate every round output into one report file
    #[command(name = "report")]
    Report {
        /// Directory holding per-round outputs
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Configuration file (defaults to graphsearch.toml when present)
        #[arg(short = 'c', long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}
