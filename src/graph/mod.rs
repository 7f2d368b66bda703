//! Graph record model, wire codec, and initial loader

pub mod codec;
pub mod loader;
pub mod node;

pub use codec::{parse, serialize, FormatError, FormatErrorKind, INFINITY_LITERAL};
pub use loader::{initial_records, parse_edge_list, EdgeListError};
pub use node::{Color, Cost, NodeId, NodeRecord};
