//! Graph-coloring BFS as a pair of pure round functions
//!
//! A round is one expand-then-merge cycle. The execution substrate only
//! sees the [`RoundJob`] trait: it calls `expand` once per input record,
//! groups everything the expansions emit by id, and calls `merge` once per
//! group. Both functions are deterministic and side-effect free, so the
//! substrate may re-invoke them after a failed task.

pub mod expand;
pub mod merge;

pub use expand::expand;
pub use merge::{merge, ContractViolation, MergeState};

use crate::graph::{NodeId, NodeRecord};

/// The two functions a round-based job registers with the substrate
pub trait RoundJob: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Map one record to the records it contributes to this round
    fn expand(&self, record: &NodeRecord) -> Vec<NodeRecord>;

    /// Reduce every record grouped under `id` to one canonical record
    fn merge(&self, id: NodeId, records: Vec<NodeRecord>) -> Result<NodeRecord, ContractViolation>;
}

/// Single-source BFS by WHITE/GRAY/BLACK coloring
#[derive(Debug, Clone, Copy, Default)]
pub struct ColoringBfs;

impl RoundJob for ColoringBfs {
    fn name(&self) -> &str {
        "graphsearch"
    }

    fn expand(&self, record: &NodeRecord) -> Vec<NodeRecord> {
        expand::expand(record)
    }

    fn merge(&self, id: NodeId, records: Vec<NodeRecord>) -> Result<NodeRecord, ContractViolation> {
        merge::merge(id, records)
    }
}
