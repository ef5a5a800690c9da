//! Filtered subgraph view
//!
//! A node predicate and an optional edge predicate over a borrowed store.
//! An edge is visible when both endpoints are visible and the edge
//! predicate, if any, accepts it.

use super::edges::EdgePredicate;
use super::GraphRead;
use crate::graph::store::{FxIndexMap, KeyMap};
use crate::graph::{Edge, EdgeKey, GraphKind, GraphResult, GraphStore, NodeId};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::Arc;

type NodePredicate<'g> = Arc<dyn Fn(&NodeId) -> bool + 'g>;

/// Selected keys per ordered pair; `None` selects every parallel edge.
type EdgeSelection = FxIndexMap<NodeId, FxIndexMap<NodeId, Option<Vec<EdgeKey>>>>;

#[derive(Clone)]
pub struct SubgraphView<'g> {
    store: &'g GraphStore,
    node_filter: Option<NodePredicate<'g>>,
    edge_filter: Option<EdgePredicate<'g>>,
}

impl GraphStore {
    /// Unfiltered subgraph view; narrow it with
    /// [`SubgraphView::filter_nodes`] and [`SubgraphView::filter_edges`].
    pub fn subgraph_view(&self) -> SubgraphView<'_> {
        SubgraphView {
            store: self,
            node_filter: None,
            edge_filter: None,
        }
    }

    /// View induced by a node set. Ids not in the store are ignored.
    pub fn subgraph<I>(&self, nodes: I) -> SubgraphView<'_>
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        let keep: IndexSet<NodeId, FxBuildHasher> = nodes.into_iter().map(Into::into).collect();
        self.subgraph_view().filter_nodes(move |node| keep.contains(node))
    }

    /// View restricted to the given edges and their endpoints. Edges not in
    /// the store are ignored; a `None` key selects every parallel edge of
    /// the pair.
    pub fn edge_subgraph<I>(&self, edges: I) -> SubgraphView<'_>
    where
        I: IntoIterator<Item = (NodeId, NodeId, Option<EdgeKey>)>,
    {
        let directed = self.is_directed();
        let multi = self.is_multigraph();
        let mut selected = EdgeSelection::default();
        let mut ends: IndexSet<NodeId, FxBuildHasher> = IndexSet::default();

        for (u, v, key) in edges {
            if !self.has_edge(&u, &v, key) {
                continue;
            }
            let key = key.filter(|_| multi);
            let mut select = |source: &NodeId, target: &NodeId| {
                let slot = selected
                    .entry(source.clone())
                    .or_default()
                    .entry(target.clone())
                    .or_insert_with(|| Some(Vec::new()));
                match key {
                    Some(key) => {
                        if let Some(keys) = slot {
                            keys.push(key);
                        }
                    }
                    None => *slot = None,
                }
            };
            select(&u, &v);
            if !directed {
                select(&v, &u);
            }
            ends.insert(u);
            ends.insert(v);
        }

        self.subgraph_view()
            .filter_nodes(move |node| ends.contains(node))
            .filter_edges(move |edge| {
                selected
                    .get(&edge.source)
                    .and_then(|row| row.get(&edge.target))
                    .map_or(false, |slot| match (slot, edge.key) {
                        (Some(keys), Some(key)) => keys.contains(&key),
                        (Some(_), None) => false,
                        (None, _) => true,
                    })
            })
    }
}

impl<'g> SubgraphView<'g> {
    pub fn filter_nodes(self, keep: impl Fn(&NodeId) -> bool + 'g) -> Self {
        let node_filter: NodePredicate<'g> = match self.node_filter {
            Some(previous) => Arc::new(move |node: &NodeId| previous(node) && keep(node)),
            None => Arc::new(keep),
        };
        SubgraphView {
            node_filter: Some(node_filter),
            ..self
        }
    }

    pub fn filter_edges(self, keep: impl Fn(&Edge) -> bool + 'g) -> Self {
        let edge_filter: EdgePredicate<'g> = match self.edge_filter {
            Some(previous) => Arc::new(move |edge: &Edge| previous(edge) && keep(edge)),
            None => Arc::new(keep),
        };
        SubgraphView {
            edge_filter: Some(edge_filter),
            ..self
        }
    }

    pub fn store(&self) -> &'g GraphStore {
        self.store
    }

    fn node_visible(&self, node: &NodeId) -> bool {
        self.node_filter.as_ref().map_or(true, |keep| keep(node))
    }

    fn edge_visible(&self, edge: &Edge) -> bool {
        self.node_visible(&edge.source)
            && self.node_visible(&edge.target)
            && self.edge_filter.as_ref().map_or(true, |keep| keep(edge))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'g NodeId> + '_ {
        self.store
            .node_table()
            .keys()
            .filter(move |node| self.node_visible(node))
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.store.edge_iter().filter(move |edge| self.edge_visible(edge))
    }

    /// Number of parallel edges `source -> target` in `keys` that are
    /// visible.
    fn visible_keys(&self, source: &NodeId, target: &NodeId, keys: &KeyMap) -> usize {
        if !self.node_visible(source) || !self.node_visible(target) {
            return 0;
        }
        let Some(keep) = &self.edge_filter else {
            return keys.len();
        };
        let multi = self.store.is_multigraph();
        keys.iter()
            .filter(|(key, attrs)| {
                keep(&Edge {
                    source: source.clone(),
                    target: target.clone(),
                    key: multi.then_some(**key),
                    attrs: Arc::clone(attrs),
                })
            })
            .count()
    }

    fn missing(&self, op: &'static str, node: &NodeId) -> crate::graph::GraphError {
        self.store.policy().admit(op).missing_node(node)
    }

    /// Materialize the view into an independent store.
    pub fn to_store(&self) -> GraphStore {
        let mut out = self.store.blank_like(self.store.kind());
        out.graph_attrs = self.store.graph_attrs().clone();
        for node in self.nodes() {
            out.put_node(node.clone(), self.store.node_attrs(node).cloned());
        }
        for edge in self.edges() {
            out.link(&edge.source, &edge.target, edge.key, Some(edge.data()));
        }
        out
    }
}

impl GraphRead for SubgraphView<'_> {
    fn kind(&self) -> GraphKind {
        self.store.kind()
    }

    fn revision(&self) -> u64 {
        self.store.revision()
    }

    fn has_node(&self, node: &NodeId) -> bool {
        self.store.has_node(node) && self.node_visible(node)
    }

    fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        self.has_node(u)
            && self.has_node(v)
            && self
                .store
                .edges_between(u, v)
                .iter()
                .filter(|edge| key.map_or(true, |k| edge.key.unwrap_or(EdgeKey::IMPLICIT) == k))
                .any(|edge| self.edge_visible(edge))
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().cloned().collect()
    }

    fn edge_list(&self) -> Vec<Edge> {
        self.edges().collect()
    }

    fn neighbor_ids(&self, node: &NodeId) -> GraphResult<Vec<NodeId>> {
        if !self.has_node(node) {
            return Err(self.missing("neighbors", node));
        }
        let row = self.store.neighbors(node)?;
        Ok(row
            .iter()
            .filter(|nbr| {
                self.store
                    .key_map(node, nbr)
                    .map_or(false, |keys| self.visible_keys(node, nbr, keys) > 0)
            })
            .cloned()
            .collect())
    }

    fn degree(&self, node: &NodeId) -> GraphResult<usize> {
        if !self.has_node(node) {
            return Err(self.missing("degree", node));
        }
        let directed = self.store.is_directed();
        let out: usize = self
            .store
            .successors(node)?
            .iter()
            .filter_map(|nbr| {
                let keys = self.store.key_map(node, nbr)?;
                let count = self.visible_keys(node, nbr, keys);
                Some(if !directed && nbr == node { 2 * count } else { count })
            })
            .sum();
        if !directed {
            return Ok(out);
        }
        let incoming: usize = self
            .store
            .predecessors(node)?
            .iter()
            .filter_map(|nbr| {
                let keys = self.store.key_map(nbr, node)?;
                Some(self.visible_keys(nbr, node, keys))
            })
            .sum();
        Ok(out + incoming)
    }
}

impl fmt::Debug for SubgraphView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubgraphView")
            .field("store", &self.store.store_id())
            .field("node_filtered", &self.node_filter.is_some())
            .field("edge_filtered", &self.edge_filter.is_some())
            .finish()
    }
}
