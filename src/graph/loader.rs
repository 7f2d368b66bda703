//! Initial graph loader
//!
//! Builds the round-0 input from a plain edge list. Each line is
//! `<src> <dst> [<weight>]`, whitespace separated, with the weight defaulting
//! to 1. Blank lines and `#` comments are ignored.

use super::node::{NodeId, NodeRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Weight used for edges listed without one
pub const DEFAULT_WEIGHT: i64 = 1;

/// A line of the edge list that could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("edge list line {line_number}: {reason}: {line:?}")]
pub struct EdgeListError {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// Parse an edge list into `(src, dst, weight)` triples, in file order
pub fn parse_edge_list(content: &str) -> Result<Vec<(NodeId, NodeId, i64)>, EdgeListError> {
    let mut edges = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let fail = |reason: &str| EdgeListError {
            line_number: index + 1,
            line: raw.to_string(),
            reason: reason.to_string(),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (src, dst, weight) = match tokens.as_slice() {
            [src, dst] => (*src, *dst, None),
            [src, dst, weight] => (*src, *dst, Some(*weight)),
            _ => return Err(fail("expected `<src> <dst> [<weight>]`")),
        };

        let src = src.parse().map_err(|_| fail("invalid source id"))?;
        let dst = dst.parse().map_err(|_| fail("invalid target id"))?;
        let weight = match weight {
            Some(token) => token.parse().map_err(|_| fail("invalid weight"))?,
            None => DEFAULT_WEIGHT,
        };

        edges.push((src, dst, weight));
    }

    Ok(edges)
}

/// Build one topology record per vertex, with `source` as the only GRAY one
///
/// Every vertex mentioned as a source or a target gets a record, and so does
/// `source` itself even when it has no edges. Records are returned sorted by
/// id; adjacency lists keep the edge-list order.
pub fn initial_records(edges: &[(NodeId, NodeId, i64)], source: NodeId) -> Vec<NodeRecord> {
    let mut adjacency: BTreeMap<NodeId, (Vec<NodeId>, Vec<i64>)> = BTreeMap::new();
    adjacency.entry(source).or_default();

    for &(src, dst, weight) in edges {
        let (targets, weights) = adjacency.entry(src).or_default();
        targets.push(dst);
        weights.push(weight);
        adjacency.entry(dst).or_default();
    }

    adjacency
        .into_iter()
        .map(|(id, (targets, weights))| {
            let record = NodeRecord::topology(id, targets, weights);
            if id == source {
                record.into_source()
            } else {
                record
            }
        })
        .collect()
}
