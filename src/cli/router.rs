//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::app::AppConfig;
use crate::cli::args::{Cli, Commands};
use crate::cli::commands::*;
use anyhow::Result;
use clap::CommandFactory;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Option<Commands>, app: &AppConfig) -> Result<()> {
    match command {
        Some(Commands::Run {
            rounds,
            map_tasks,
            reduce_tasks,
            input,
            output,
            config,
            no_report,
            json,
        }) => {
            let params = RunParams {
                rounds,
                map_tasks,
                reduce_tasks,
                input,
                output,
                config,
                no_report,
                json,
            };
            run_search_command(params, app).await
        }
        Some(Commands::Init {
            edges,
            source,
            input,
            config,
        }) => run_init_command(edges, source, input, config, app).await,
        Some(Commands::Report { output, config }) => {
            run_report_command(output, config, app).await
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
