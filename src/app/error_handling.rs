//! Error handling utilities
//!
//! Maps failures to process exit codes:
//!
//! | code | meaning |
//! |------|---------|
//! | 1    | the run failed (I/O, configuration, task failure) |
//! | 2    | bad arguments, e.g. fewer than one round |
//! | 65   | bad data: malformed record, edge list, or broken grouping invariant |

use crate::error::Error;
use tracing::error;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_DATA_ERROR: i32 = 65;

/// Exit code for an error that ends the process
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(Error::Usage(_)) => EXIT_USAGE,
        Some(err) if err.is_data_error() => EXIT_DATA_ERROR,
        _ => EXIT_FAILURE,
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// # Verbose Mode Behavior
/// - `verbose = 0`: the error message only
/// - `verbose >= 1`: the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    eprintln!("Error: {error:#}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}
