//! Canonical merge step
//!
//! All records sharing an id in one round are folded into exactly one record:
//!
//! - topology (edges and weights) comes from the record that carries it
//! - cost is the minimum cost in the group
//! - color is the darkest color in the group, except that a vertex already
//!   BLACK is re-discovered (GRAY) when a GRAY record offers a strictly lower
//!   cost than every BLACK record, so that the cheaper path gets expanded
//!
//! Each rule only looks at aggregates of the whole group, so the result does
//! not depend on arrival order or on records being delivered more than once.

use crate::graph::{Color, Cost, NodeId, NodeRecord};
use thiserror::Error;

/// The shuffle or the expansion step broke a grouping invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("merge group for node {id} is empty")]
    EmptyGroup { id: NodeId },

    #[error("merge group for node {id} carries conflicting adjacency lists")]
    ConflictingTopology { id: NodeId },

    #[error("record for node {found} was grouped under node {expected}")]
    ForeignRecord { expected: NodeId, found: NodeId },
}

/// Running aggregate of one merge group
#[derive(Debug, Clone)]
pub struct MergeState {
    id: NodeId,
    topology: Option<(Vec<NodeId>, Vec<i64>)>,
    cost: Cost,
    darkest: Color,
    best_black: Option<Cost>,
    best_gray: Option<Cost>,
    records: usize,
}

impl MergeState {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            topology: None,
            cost: Cost::Infinite,
            darkest: Color::White,
            best_black: None,
            best_gray: None,
            records: 0,
        }
    }

    /// Fold one record into the aggregate
    pub fn absorb(&mut self, record: NodeRecord) -> Result<(), ContractViolation> {
        if record.id != self.id {
            return Err(ContractViolation::ForeignRecord {
                expected: self.id,
                found: record.id,
            });
        }

        self.cost = self.cost.min(record.cost);
        self.darkest = self.darkest.max(record.color);
        match record.color {
            Color::Black => self.best_black = Some(lower(self.best_black, record.cost)),
            Color::Gray => self.best_gray = Some(lower(self.best_gray, record.cost)),
            Color::White => {}
        }

        if record.has_topology() {
            match &self.topology {
                Some((edges, weights)) => {
                    // A re-delivered copy is fine; a different adjacency list is not.
                    if *edges != record.edges || *weights != record.weights {
                        return Err(ContractViolation::ConflictingTopology { id: self.id });
                    }
                }
                None => self.topology = Some((record.edges, record.weights)),
            }
        }

        self.records += 1;
        Ok(())
    }

    /// Number of records absorbed so far
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Produce the canonical record
    pub fn finish(self) -> Result<NodeRecord, ContractViolation> {
        if self.is_empty() {
            return Err(ContractViolation::EmptyGroup { id: self.id });
        }

        let color = match (self.best_black, self.best_gray) {
            (Some(black), Some(gray)) if gray < black => Color::Gray,
            _ => self.darkest,
        };
        let (edges, weights) = self.topology.unwrap_or_default();

        Ok(NodeRecord {
            id: self.id,
            edges,
            weights,
            cost: self.cost,
            color,
        })
    }
}

fn lower(current: Option<Cost>, candidate: Cost) -> Cost {
    current.map_or(candidate, |cost| cost.min(candidate))
}

/// Merge every record grouped under `id` into one canonical record
pub fn merge<I>(id: NodeId, records: I) -> Result<NodeRecord, ContractViolation>
where
    I: IntoIterator<Item = NodeRecord>,
{
    let mut state = MergeState::new(id);
    for record in records {
        state.absorb(record)?;
    }
    state.finish()
}
