//! Live reversed projection of a directed store
//!
//! Reads swap edge endpoints; writes are forwarded to the underlying store
//! with the endpoints swapped back, so `add_edge(u, v)` through the view
//! stores `v -> u`.

use super::{EdgeView, GraphRead, NeighborView, NodeView};
use crate::graph::{
    AttrBag, AttrValue, Edge, EdgeInput, EdgeKey, GraphKind, GraphResult, GraphStore, NodeId,
    NodeInput, SharedAttrs, UpdateSource,
};

#[derive(Debug)]
pub struct ReverseView<'g> {
    store: &'g mut GraphStore,
}

impl GraphStore {
    /// Reversed view sharing this store's storage. Directed stores only.
    pub fn reverse_view(&mut self) -> GraphResult<ReverseView<'_>> {
        if !self.is_directed() {
            return Err(self
                .policy()
                .admit("reverse")
                .unsupported("reverse is only defined for directed graphs"));
        }
        Ok(ReverseView { store: self })
    }
}

impl<'g> ReverseView<'g> {
    /// The underlying store
    pub fn store(&self) -> &GraphStore {
        self.store
    }

    pub fn nodes(&self) -> NodeView<'_> {
        self.store.nodes()
    }

    pub fn edges(&self) -> EdgeView<'_> {
        self.store.edges().reversed()
    }

    pub fn successors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.store.predecessors(node)
    }

    pub fn predecessors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.store.successors(node)
    }

    pub fn in_degree(&self, node: &NodeId) -> GraphResult<usize> {
        self.store.out_degree(node)
    }

    pub fn out_degree(&self, node: &NodeId) -> GraphResult<usize> {
        self.store.in_degree(node)
    }

    pub fn has_node(&self, node: &NodeId) -> bool {
        self.store.has_node(node)
    }

    pub fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        self.store.has_edge(v, u, key)
    }

    /// Successors in the reversed orientation.
    pub fn neighbors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.store.predecessors(node)
    }

    pub fn degree(&self, node: &NodeId) -> GraphResult<usize> {
        self.store.degree(node)
    }

    pub fn number_of_edges_between(&self, u: &NodeId, v: &NodeId) -> usize {
        self.store.number_of_edges_between(v, u)
    }

    pub fn edge_keys(&self, u: &NodeId, v: &NodeId) -> Vec<EdgeKey> {
        self.store.edge_keys(v, u)
    }

    pub fn edge_attrs(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> Option<SharedAttrs> {
        self.store.edge_attrs(v, u, key)
    }

    pub fn get_edge_data(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> Option<AttrBag> {
        self.store.get_edge_data(v, u, key)
    }

    // ============================================================
    // Forwarded mutation
    // ============================================================

    pub fn add_node(&mut self, id: impl Into<NodeId>) -> GraphResult<()> {
        self.store.add_node(id)
    }

    pub fn add_node_with_attrs(
        &mut self,
        id: impl Into<NodeId>,
        attrs: AttrBag,
    ) -> GraphResult<()> {
        self.store.add_node_with_attrs(id, attrs)
    }

    pub fn add_nodes_from<I>(&mut self, nodes: I) -> GraphResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeInput>,
    {
        self.store.add_nodes_from(nodes)
    }

    pub fn add_nodes_from_with_attrs<I>(&mut self, nodes: I, common: &AttrBag) -> GraphResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeInput>,
    {
        self.store.add_nodes_from_with_attrs(nodes, common)
    }

    pub fn remove_node(&mut self, id: &NodeId) -> GraphResult<AttrBag> {
        self.store.remove_node(id)
    }

    pub fn remove_nodes_from<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        self.store.remove_nodes_from(nodes)
    }

    pub fn add_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>) -> GraphResult<EdgeKey> {
        self.store.add_edge(v, u)
    }

    pub fn add_edge_with_attrs(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        attrs: AttrBag,
    ) -> GraphResult<EdgeKey> {
        self.store.add_edge_with_attrs(v, u, attrs)
    }

    pub fn add_keyed_edge(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        key: EdgeKey,
        attrs: AttrBag,
    ) -> GraphResult<EdgeKey> {
        self.store.add_keyed_edge(v, u, key, attrs)
    }

    pub fn add_edges_from<I>(&mut self, edges: I) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        self.add_edges_from_with_attrs(edges, &AttrBag::new())
    }

    pub fn add_edges_from_with_attrs<I>(
        &mut self,
        edges: I,
        common: &AttrBag,
    ) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        let swapped = edges.into_iter().map(|edge| Into::<EdgeInput>::into(edge).swapped());
        self.store.add_edges_from_with_attrs(swapped, common)
    }

    /// Dynamic tuples are forwarded with their first two items exchanged;
    /// the store applies the usual arity rules to the result.
    pub fn add_edges_from_values<I>(&mut self, tuples: I) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator<Item = AttrValue>,
    {
        self.store
            .add_edges_from_values(tuples.into_iter().map(|tuple| match tuple {
                AttrValue::Array(mut items) if items.len() >= 2 => {
                    items.swap(0, 1);
                    AttrValue::Array(items)
                }
                other => other,
            }))
    }

    pub fn add_weighted_edges_from<I, A, B>(
        &mut self,
        edges: I,
        weight_name: &str,
    ) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator<Item = (A, B, f64)>,
        A: Into<NodeId>,
        B: Into<NodeId>,
    {
        self.store.add_weighted_edges_from(
            edges.into_iter().map(|(u, v, w)| (v.into(), u.into(), w)),
            weight_name,
        )
    }

    pub fn remove_edge(
        &mut self,
        u: &NodeId,
        v: &NodeId,
        key: Option<EdgeKey>,
    ) -> GraphResult<EdgeKey> {
        self.store.remove_edge(v, u, key)
    }

    pub fn remove_edges_from<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        let swapped = edges.into_iter().map(|edge| Into::<EdgeInput>::into(edge).swapped());
        self.store.remove_edges_from(swapped)
    }

    /// Merge `source` into the underlying store with every edge reversed.
    ///
    /// A graph source is read in its own orientation, so its edge `u -> v`
    /// appears in this view as `u -> v` too.
    pub fn update(
        &mut self,
        source: UpdateSource<'_>,
        graph_attrs: Option<AttrBag>,
    ) -> GraphResult<()> {
        let source = match source {
            UpdateSource::Graph(other) => {
                let keep_keys = self.store.is_multigraph() && other.is_multigraph();
                let nodes = other
                    .nodes()
                    .data()
                    .map(|(id, attrs)| NodeInput::WithAttrs(id.clone(), attrs.clone()))
                    .collect();
                let edges = other
                    .edges()
                    .iter()
                    .map(|edge| {
                        let data = edge.data();
                        match edge.key {
                            Some(key) if keep_keys => {
                                EdgeInput::Full(edge.target, edge.source, key, data)
                            }
                            _ => EdgeInput::WithAttrs(edge.target, edge.source, data),
                        }
                    })
                    .collect();
                let mut attrs = other.graph_attrs().clone();
                if let Some(extra) = graph_attrs {
                    attrs.merge_owned(extra);
                }
                return self.store.update(
                    UpdateSource::Parts {
                        nodes: Some(nodes),
                        edges: Some(edges),
                    },
                    Some(attrs),
                );
            }
            UpdateSource::Parts { nodes, edges } => UpdateSource::Parts {
                nodes,
                edges: edges.map(|edges| edges.into_iter().map(EdgeInput::swapped).collect()),
            },
        };
        self.store.update(source, graph_attrs)
    }

    pub fn set_edge_attr(
        &mut self,
        u: &NodeId,
        v: &NodeId,
        key: Option<EdgeKey>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<Option<AttrValue>> {
        self.store.set_edge_attr(v, u, key, name, value)
    }
}

impl GraphRead for ReverseView<'_> {
    fn kind(&self) -> GraphKind {
        self.store.kind()
    }

    fn revision(&self) -> u64 {
        self.store.revision()
    }

    fn has_node(&self, node: &NodeId) -> bool {
        self.store.has_node(node)
    }

    fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        self.store.has_edge(v, u, key)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.store.nodes().to_vec()
    }

    fn edge_list(&self) -> Vec<Edge> {
        self.edges().to_vec()
    }

    fn neighbor_ids(&self, node: &NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.successors(node)?.to_vec())
    }

    fn degree(&self, node: &NodeId) -> GraphResult<usize> {
        self.store.degree(node)
    }

    fn edge_count(&self) -> usize {
        self.store.edge_count()
    }
}
