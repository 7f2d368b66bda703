//! Frontier expansion step
//!
//! WHITE and BLACK records pass through unchanged. A GRAY record emits one
//! frontier record per outgoing edge, costed at its own cost plus the edge
//! weight, and is then re-emitted BLACK with its topology and cost intact.

use crate::graph::{Color, NodeRecord};

/// Expand one record into its successors plus its own (possibly recolored) copy
///
/// A GRAY record of out-degree `k` yields `k + 1` records; anything else
/// yields exactly the input.
pub fn expand(record: &NodeRecord) -> Vec<NodeRecord> {
    match record.color {
        Color::White | Color::Black => vec![record.clone()],
        Color::Gray => {
            let mut out = Vec::with_capacity(record.edges.len() + 1);
            out.extend(
                record
                    .neighbors()
                    .map(|(target, weight)| NodeRecord::frontier(target, record.cost.extend(weight))),
            );
            out.push(record.clone().with_color(Color::Black));
            out
        }
    }
}
