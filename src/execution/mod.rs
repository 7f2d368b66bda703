//! Local execution substrate
//!
//! Runs a [`RoundJob`](crate::search::RoundJob) round by round on the local
//! filesystem: partitioned storage per round, concurrent expand and merge
//! tasks with a barrier between phases, and task-level retry.

pub mod driver;
pub mod phases;
pub mod retry;
pub mod storage;

pub use driver::{RoundDriver, RoundSummary, RunSummary};
pub use phases::{ColorCounts, PhaseExecutor, PhaseMetrics, PhaseResult, PhaseType, RoundContext};
pub use retry::{RetryPolicy, TaskLabel};
pub use storage::RoundStore;
