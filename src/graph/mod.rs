//! Core graph store implementation
//!
//! This module implements the attributed graph model with:
//! - Nodes keyed by dynamic identifiers, each with an attribute bag
//! - Edges with shared attribute bags, optionally keyed for parallel edges
//! - Undirected / directed and simple / multi variants behind one store type
//! - In-memory storage with insertion-ordered hash indices

pub mod bulk;
pub mod convert;
pub mod error;
pub mod input;
pub mod keys;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use bulk::{
    empty_graph, from_adjacency_map, from_document, from_edges, from_json_str, to_document,
    to_json_string, IngestReport,
};
pub use error::{ErrorKind, GraphError, GraphResult};
pub use input::{EdgeInput, NodeInput, UpdateSource};
pub use keys::EdgeKeyAllocator;
pub use property::{AttrBag, AttrValue, SharedAttrs};
pub use store::{Edge, GraphStore};
pub use types::{Direction, EdgeKey, GraphKind, NodeId};
