//! Textual node record format
//!
//! One record per line:
//!
//! ```text
//! <id>\t<e1>,<e2>,...|<w1>,<w2>,...|<cost-or-INF>|<COLOR>
//! ```
//!
//! Edge and weight lists may be empty. The cost field is either a decimal
//! integer or the infinity literal [`INFINITY_LITERAL`].

use super::node::{Color, Cost, NodeId, NodeRecord};
use std::fmt::Write as _;
use thiserror::Error;

/// Separator between the id and the value part of a line
pub const ID_SEPARATOR: char = '\t';
/// Separator between the four value fields
pub const FIELD_SEPARATOR: char = '|';
/// Separator between list items
pub const LIST_SEPARATOR: char = ',';
/// Rendering of an infinite cost
pub const INFINITY_LITERAL: &str = "INF";
/// Infinity token written by older producers, accepted on read
pub const LEGACY_INFINITY_LITERAL: &str = "Integer.MAX_VALUE";

const VALUE_FIELDS: usize = 4;

/// What was wrong with a malformed line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("missing id/value separator")]
    MissingSeparator,

    #[error("invalid node id {0:?}")]
    InvalidId(String),

    #[error("expected 4 '|'-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("non-numeric {field} token {token:?}")]
    InvalidNumber { field: &'static str, token: String },

    #[error("{edges} edges but {weights} weights")]
    LengthMismatch { edges: usize, weights: usize },

    #[error("unrecognized color {0:?}")]
    UnknownColor(String),
}

/// A node record line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed node record {line:?}: {kind}")]
pub struct FormatError {
    pub line: String,
    pub kind: FormatErrorKind,
}

impl FormatError {
    fn new(line: &str, kind: FormatErrorKind) -> Self {
        Self {
            line: line.to_string(),
            kind,
        }
    }
}

/// Parse one record line
///
/// A single trailing line terminator (`\n` or `\r\n`) is tolerated.
pub fn parse(line: &str) -> Result<NodeRecord, FormatError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let fail = |kind| FormatError::new(line, kind);

    let (key, value) = line
        .split_once(ID_SEPARATOR)
        .ok_or_else(|| fail(FormatErrorKind::MissingSeparator))?;

    let id: NodeId = key
        .trim()
        .parse()
        .map_err(|_| fail(FormatErrorKind::InvalidId(key.to_string())))?;

    let fields: Vec<&str> = value.split(FIELD_SEPARATOR).collect();
    if fields.len() != VALUE_FIELDS {
        return Err(fail(FormatErrorKind::FieldCount {
            found: fields.len(),
        }));
    }

    let edges: Vec<NodeId> = parse_list(fields[0], "edge").map_err(fail)?;
    let weights: Vec<i64> = parse_list(fields[1], "weight").map_err(fail)?;
    if edges.len() != weights.len() {
        return Err(fail(FormatErrorKind::LengthMismatch {
            edges: edges.len(),
            weights: weights.len(),
        }));
    }

    let cost = parse_cost(fields[2]).map_err(fail)?;
    let color = fields[3]
        .parse::<Color>()
        .map_err(|e| fail(FormatErrorKind::UnknownColor(e.0)))?;

    Ok(NodeRecord {
        id,
        edges,
        weights,
        cost,
        color,
    })
}

/// Render a record as one line, without a terminator
pub fn serialize(record: &NodeRecord) -> String {
    let mut line = String::with_capacity(16 + record.edges.len() * 8);
    let _ = write!(line, "{}{}", record.id, ID_SEPARATOR);
    push_list(&mut line, &record.edges);
    line.push(FIELD_SEPARATOR);
    push_list(&mut line, &record.weights);
    line.push(FIELD_SEPARATOR);
    match record.cost {
        Cost::Finite(cost) => {
            let _ = write!(line, "{cost}");
        }
        Cost::Infinite => line.push_str(INFINITY_LITERAL),
    }
    line.push(FIELD_SEPARATOR);
    line.push_str(record.color.as_str());
    line
}

fn parse_list<T: std::str::FromStr>(
    field: &str,
    name: &'static str,
) -> Result<Vec<T>, FormatErrorKind> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(LIST_SEPARATOR)
        .map(|token| {
            token
                .trim()
                .parse::<T>()
                .map_err(|_| FormatErrorKind::InvalidNumber {
                    field: name,
                    token: token.to_string(),
                })
        })
        .collect()
}

fn parse_cost(token: &str) -> Result<Cost, FormatErrorKind> {
    match token.trim() {
        INFINITY_LITERAL | LEGACY_INFINITY_LITERAL => Ok(Cost::Infinite),
        digits => digits
            .parse::<i64>()
            .map(Cost::Finite)
            .map_err(|_| FormatErrorKind::InvalidNumber {
                field: "cost",
                token: token.to_string(),
            }),
    }
}

fn push_list<T: std::fmt::Display>(line: &mut String, items: &[T]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            line.push(LIST_SEPARATOR);
        }
        let _ = write!(line, "{item}");
    }
}
