//! Node record model exchanged between rounds
//!
//! A `NodeRecord` is the unit of data flowing through every round. Two
//! flavors share the type: topology records, which carry the adjacency list
//! of their vertex, and frontier records, which are synthesized during
//! expansion and carry only an id, a cost, and the GRAY color.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a graph vertex
pub type NodeId = u64;

/// Discovery state of a vertex
///
/// Variants are declared in darkness order so the derived `Ord` gives
/// WHITE < GRAY < BLACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    /// Undiscovered
    White,
    /// Discovered, still to be expanded
    Gray,
    /// Fully expanded
    Black,
}

impl Color {
    /// All colors, lightest first
    pub const ALL: [Color; 3] = [Color::White, Color::Gray, Color::Black];

    /// Wire name of the color
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::White => "WHITE",
            Color::Gray => "GRAY",
            Color::Black => "BLACK",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token is not one of the three color names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColor(pub String);

impl fmt::Display for UnknownColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color {:?}", self.0)
    }
}

impl std::error::Error for UnknownColor {}

impl FromStr for Color {
    type Err = UnknownColor;

    // Case-sensitive: only the upper-case names are valid on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WHITE" => Ok(Color::White),
            "GRAY" => Ok(Color::Gray),
            "BLACK" => Ok(Color::Black),
            other => Err(UnknownColor(other.to_string())),
        }
    }
}

/// Distance estimate from the source vertex
///
/// `Infinite` sorts after every finite cost, so `min` over costs is the
/// relaxation step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Cost {
    Finite(i64),
    #[default]
    Infinite,
}

impl Cost {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Cost::Infinite)
    }

    /// Cost of reaching a neighbor over an edge of the given weight
    ///
    /// Saturates: an infinite cost stays infinite and overflow clamps to
    /// `i64::MAX`.
    pub fn extend(self, weight: i64) -> Cost {
        match self {
            Cost::Finite(cost) => Cost::Finite(cost.saturating_add(weight)),
            Cost::Infinite => Cost::Infinite,
        }
    }
}

impl From<i64> for Cost {
    fn from(cost: i64) -> Self {
        Cost::Finite(cost)
    }
}

/// One vertex's record for one round
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRecord {
    pub id: NodeId,
    /// Outgoing neighbors; empty means the record carries no topology
    pub edges: Vec<NodeId>,
    /// `weights[i]` is the cost of traversing `edges[i]`
    pub weights: Vec<i64>,
    pub cost: Cost,
    pub color: Color,
}

impl NodeRecord {
    /// Topology record of an undiscovered vertex
    pub fn topology(id: NodeId, edges: Vec<NodeId>, weights: Vec<i64>) -> Self {
        debug_assert_eq!(edges.len(), weights.len());
        Self {
            id,
            edges,
            weights,
            cost: Cost::Infinite,
            color: Color::White,
        }
    }

    /// Synthetic frontier record created while expanding a neighbor
    pub fn frontier(id: NodeId, cost: Cost) -> Self {
        Self {
            id,
            edges: Vec::new(),
            weights: Vec::new(),
            cost,
            color: Color::Gray,
        }
    }

    /// Mark this record as the search source: cost 0, GRAY
    pub fn into_source(self) -> Self {
        Self {
            cost: Cost::Finite(0),
            color: Color::Gray,
            ..self
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn with_cost(self, cost: Cost) -> Self {
        Self { cost, ..self }
    }

    /// Whether this record carries the vertex's adjacency list
    pub fn has_topology(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Outgoing edges paired with their weights
    pub fn neighbors(&self) -> impl Iterator<Item = (NodeId, i64)> + '_ {
        self.edges.iter().copied().zip(self.weights.iter().copied())
    }
}
