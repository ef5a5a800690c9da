//! Compatgraph
//!
//! An in-memory attributed graph store with NetworkX-compatible semantics:
//! undirected and directed, simple and multi graphs behind one store type,
//! live views, revision-keyed caches and a strict / hardened policy gate
//! for untrusted input.
//!
//! # Architecture
//!
//! - `graph`: the store, its key allocator, conversions and bulk ingest
//! - `view`: node, edge, neighbor, subgraph and reversed projections, plus
//!   cached projections keyed on the store revision
//! - `policy`: per-request admission with allowlisted, budgeted recoveries
//!
//! ## Example Usage
//!
//! ```rust
//! use compatgraph::graph::{AttrBag, EdgeKey, GraphStore, NodeId};
//! use compatgraph::view::CachedView;
//!
//! let mut store = GraphStore::multi_directed();
//! let k0 = store.add_edge("a", "b").unwrap();
//! let k1 = store.add_edge("a", "b").unwrap();
//! assert_eq!((k0, k1), (EdgeKey(0), EdgeKey(1)));
//!
//! let mut degrees = CachedView::new("out_degree", |g: &GraphStore| {
//!     g.out_degree(&NodeId::from("a")).unwrap_or(0)
//! });
//! assert_eq!(*degrees.read(&store), 2);
//!
//! // Keyless removal takes the most recent parallel edge.
//! let a = NodeId::from("a");
//! let b = NodeId::from("b");
//! assert_eq!(store.remove_edge(&a, &b, None).unwrap(), k1);
//! assert_eq!(*degrees.read(&store), 1);
//!
//! let mut attrs = AttrBag::new();
//! attrs.insert("weight", 2.5);
//! store.add_edge_with_attrs("b", "c", attrs).unwrap();
//! assert_eq!(store.edges().len(), 2);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod policy;
pub mod view;

// Re-export main types for convenience
pub use graph::{
    AttrBag, AttrValue, Edge, EdgeInput, EdgeKey, ErrorKind, GraphError, GraphKind, GraphResult,
    GraphStore, NodeId, NodeInput, UpdateSource,
};

pub use policy::{PolicyConfig, PolicyEngine, PolicyMode, Recovery};

pub use view::{CachedView, EdgeView, GraphRead, NeighborView, NodeView, ReverseView, SubgraphView};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
