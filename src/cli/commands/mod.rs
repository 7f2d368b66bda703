//! Command implementation modules
//!
//! Each command is implemented as a separate module.

pub mod init;
pub mod report;
pub mod run;

// Re-export command execution functions
pub use init::run_init_command;
pub use report::run_report_command;
pub use run::{run_search_command, RunParams};
