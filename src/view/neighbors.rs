//! Neighbor view of a single node

use crate::graph::store::AdjRow;
use crate::graph::{Direction, Edge, EdgeKey, GraphStore, NodeId, SharedAttrs};
use std::sync::Arc;

/// Live view of the neighbors of one node in one direction.
///
/// On undirected stores both directions read the same adjacency row.
#[derive(Debug, Clone)]
pub struct NeighborView<'g> {
    node: NodeId,
    direction: Direction,
    multi: bool,
    row: &'g AdjRow,
}

impl<'g> NeighborView<'g> {
    /// `None` when `node` is not in the store
    pub(crate) fn new(store: &'g GraphStore, node: &NodeId, direction: Direction) -> Option<Self> {
        let row = store.adjacency(direction).get(node)?;
        Some(NeighborView {
            node: node.clone(),
            direction,
            multi: store.is_multigraph(),
            row,
        })
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn iter(&self) -> impl Iterator<Item = &'g NodeId> + 'g {
        self.row.keys()
    }

    /// Number of distinct neighbors
    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    pub fn contains(&self, neighbor: &NodeId) -> bool {
        self.row.contains_key(neighbor)
    }

    /// Keys of the parallel edges to `neighbor`, oldest first
    pub fn keys(&self, neighbor: &NodeId) -> Vec<EdgeKey> {
        self.row
            .get(neighbor)
            .map(|keys| keys.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn attrs(&self, neighbor: &NodeId, key: Option<EdgeKey>) -> Option<SharedAttrs> {
        let keys = self.row.get(neighbor)?;
        match key {
            Some(key) => keys.get(&key).cloned(),
            None => keys.first().map(|(_, attrs)| Arc::clone(attrs)),
        }
    }

    /// Incident edges, oriented away from the node for `Out` and towards
    /// it for `In`
    pub fn edges(&self) -> impl Iterator<Item = Edge> + 'g {
        let node = self.node.clone();
        let direction = self.direction;
        let multi = self.multi;
        self.row.iter().flat_map(move |(nbr, keys)| {
            let node = node.clone();
            keys.iter().map(move |(key, attrs)| {
                let (source, target) = match direction {
                    Direction::Out => (node.clone(), nbr.clone()),
                    Direction::In => (nbr.clone(), node.clone()),
                };
                Edge {
                    source,
                    target,
                    key: multi.then_some(*key),
                    attrs: Arc::clone(attrs),
                }
            })
        })
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.iter().cloned().collect()
    }
}
