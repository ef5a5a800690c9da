//! Read-only projections over a graph store
//!
//! Views borrow the store and read it on every access, so they always
//! reflect the current state; the borrow checker keeps a view from
//! outliving a mutation of its store. [`CachedView`] is the one projection
//! that keeps a materialized copy, and it revalidates against the store's
//! revision before every read.

pub mod cache;
pub mod edges;
pub mod neighbors;
pub mod nodes;
pub mod reverse;
pub mod subgraph;

pub use cache::CachedView;
pub use edges::EdgeView;
pub use neighbors::NeighborView;
pub use nodes::NodeView;
pub use reverse::ReverseView;
pub use subgraph::SubgraphView;

use crate::graph::{Edge, EdgeKey, GraphKind, GraphResult, GraphStore, NodeId};

/// Read surface shared by the store and its graph-shaped projections.
pub trait GraphRead {
    fn kind(&self) -> GraphKind;

    fn is_directed(&self) -> bool {
        self.kind().directed
    }

    fn is_multigraph(&self) -> bool {
        self.kind().multi
    }

    /// Revision of the underlying store.
    fn revision(&self) -> u64;

    fn has_node(&self, node: &NodeId) -> bool;

    fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool;

    fn node_ids(&self) -> Vec<NodeId>;

    fn edge_list(&self) -> Vec<Edge>;

    /// Neighbors (successors when directed), failing on an absent node.
    fn neighbor_ids(&self, node: &NodeId) -> GraphResult<Vec<NodeId>>;

    fn degree(&self, node: &NodeId) -> GraphResult<usize>;

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    fn edge_count(&self) -> usize {
        self.edge_list().len()
    }
}

impl GraphRead for GraphStore {
    fn kind(&self) -> GraphKind {
        GraphStore::kind(self)
    }

    fn revision(&self) -> u64 {
        GraphStore::revision(self)
    }

    fn has_node(&self, node: &NodeId) -> bool {
        GraphStore::has_node(self, node)
    }

    fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        GraphStore::has_edge(self, u, v, key)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().to_vec()
    }

    fn edge_list(&self) -> Vec<Edge> {
        self.edges().to_vec()
    }

    fn neighbor_ids(&self, node: &NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.neighbors(node)?.to_vec())
    }

    fn degree(&self, node: &NodeId) -> GraphResult<usize> {
        GraphStore::degree(self, node)
    }

    fn node_count(&self) -> usize {
        GraphStore::node_count(self)
    }

    fn edge_count(&self) -> usize {
        GraphStore::edge_count(self)
    }
}
