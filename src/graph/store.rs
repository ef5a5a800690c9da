//! In-memory graph storage implementation
//!
//! One store type covers the four variants (undirected / directed, simple /
//! multi) through its [`GraphKind`] flags:
//! - nodes: NodeId -> AttrBag, insertion ordered
//! - succ: NodeId -> (NodeId -> (EdgeKey -> SharedAttrs))
//! - pred: mirror of `succ` keyed by target, directed stores only
//!
//! Undirected stores keep a single table in which every edge appears under
//! both endpoints. Every edge is written and erased by [`GraphStore::link`]
//! and [`GraphStore::unlink`], which update both mirrors together and hand
//! the same shared attribute bag to each.

use super::error::GraphResult;
use super::input::{EdgeInput, NodeInput, UpdateSource};
use super::keys::EdgeKeyAllocator;
use super::property::{share, AttrBag, AttrValue, SharedAttrs};
use super::types::{Direction, EdgeKey, GraphKind, NodeId};
use crate::policy::{Admission, PolicyEngine, PolicyMode};
use crate::view::{EdgeView, NeighborView, NodeView};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Parallel edges between one ordered endpoint pair.
pub(crate) type KeyMap = FxIndexMap<EdgeKey, SharedAttrs>;

/// Neighbors of one node.
pub(crate) type AdjRow = FxIndexMap<NodeId, KeyMap>;

pub(crate) type AdjTable = FxIndexMap<NodeId, AdjRow>;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// An edge as produced by iteration.
///
/// `key` is `Some` for multigraphs only. `attrs` is the live shared bag of
/// the edge, not a copy.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub key: Option<EdgeKey>,
    pub attrs: SharedAttrs,
}

impl Edge {
    /// Snapshot of the edge attributes.
    pub fn data(&self) -> AttrBag {
        self.attrs.read().clone()
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        self.attrs.read().get(name).cloned()
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.source, &self.target)
    }

    /// The same edge seen with its endpoints swapped.
    pub fn reversed(self) -> Edge {
        Edge {
            source: self.target,
            target: self.source,
            ..self
        }
    }

    /// Check if this edge joins `u` and `v`; orientation matters only when
    /// `directed` is set.
    pub fn connects(&self, u: &NodeId, v: &NodeId, directed: bool) -> bool {
        (&self.source == u && &self.target == v)
            || (!directed && &self.source == v && &self.target == u)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.key == other.key
            && (Arc::ptr_eq(&self.attrs, &other.attrs) || *self.attrs.read() == *other.attrs.read())
    }
}

/// In-memory graph store.
#[derive(Debug)]
pub struct GraphStore {
    pub(super) id: u64,
    pub(super) kind: GraphKind,
    pub(crate) graph_attrs: AttrBag,
    pub(super) nodes: FxIndexMap<NodeId, AttrBag>,
    pub(super) succ: AdjTable,
    pub(super) pred: AdjTable,
    pub(super) keys: EdgeKeyAllocator,
    /// Advances once per mutating call; never on reads.
    pub(super) revision: u64,
    pub(super) policy: PolicyEngine,
}

impl GraphStore {
    /// Create a new empty store under the strict policy
    pub fn new(kind: GraphKind) -> Self {
        Self::with_policy(kind, PolicyEngine::strict())
    }

    /// Create a new empty store gated by `policy`
    pub fn with_policy(kind: GraphKind, policy: PolicyEngine) -> Self {
        GraphStore {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            graph_attrs: AttrBag::new(),
            nodes: FxIndexMap::default(),
            succ: AdjTable::default(),
            pred: AdjTable::default(),
            keys: EdgeKeyAllocator::new(kind.directed),
            revision: 0,
            policy,
        }
    }

    pub fn undirected() -> Self {
        Self::new(GraphKind::UNDIRECTED)
    }

    pub fn directed() -> Self {
        Self::new(GraphKind::DIRECTED)
    }

    pub fn multi_undirected() -> Self {
        Self::new(GraphKind::MULTI_UNDIRECTED)
    }

    pub fn multi_directed() -> Self {
        Self::new(GraphKind::MULTI_DIRECTED)
    }

    // ============================================================
    // Capabilities
    // ============================================================

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.kind.multi
    }

    /// Current value of the monotonic revision counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Process-unique identity of this store; copies get a new one.
    pub fn store_id(&self) -> u64 {
        self.id
    }

    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    pub fn mode(&self) -> PolicyMode {
        self.policy.mode()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    // ============================================================
    // Node mutation
    // ============================================================

    /// Add a node, or touch it if it already exists
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> GraphResult<()> {
        self.add_node_with_attrs(id, AttrBag::new())
    }

    /// Add a node with attributes; an existing node has `attrs` merged
    /// into its bag in place.
    pub fn add_node_with_attrs(
        &mut self,
        id: impl Into<NodeId>,
        attrs: AttrBag,
    ) -> GraphResult<()> {
        let id = id.into();
        self.policy.admit("add_node").node(&id)?;
        self.put_node(id, Some(attrs));
        self.bump();
        Ok(())
    }

    pub fn add_nodes_from<I>(&mut self, nodes: I) -> GraphResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeInput>,
    {
        self.add_nodes_from_with_attrs(nodes, &AttrBag::new())
    }

    /// Add many nodes; per-item attributes override `common`. Duplicates
    /// merge (last write per key wins). A null identifier anywhere rejects
    /// the whole batch.
    pub fn add_nodes_from_with_attrs<I>(&mut self, nodes: I, common: &AttrBag) -> GraphResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeInput>,
    {
        let batch: Vec<NodeInput> = nodes.into_iter().map(Into::into).collect();
        self.policy.admit("add_nodes_from").nodes(batch.iter().map(NodeInput::id))?;
        if batch.is_empty() {
            return Ok(());
        }
        self.apply_nodes(batch, common);
        self.bump();
        Ok(())
    }

    /// Remove a node and every incident edge, returning its attributes
    pub fn remove_node(&mut self, id: &NodeId) -> GraphResult<AttrBag> {
        self.policy.admit("remove_node").node(id)?;
        match self.detach_node(id) {
            Some(attrs) => {
                self.bump();
                Ok(attrs)
            }
            None => Err(self.policy.admit("remove_node").missing_node(id)),
        }
    }

    /// Remove every listed node that exists; absent ids are skipped.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_nodes_from<I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        let removed = nodes
            .into_iter()
            .map(Into::into)
            .filter(|id: &NodeId| self.detach_node(id).is_some())
            .count();
        if removed > 0 {
            self.bump();
        }
        removed
    }

    // ============================================================
    // Edge mutation
    // ============================================================

    /// Add an edge, creating missing endpoints.
    ///
    /// Multigraphs allocate a fresh key; simple graphs return the implicit
    /// key and re-adding an existing edge leaves it unchanged.
    pub fn add_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>) -> GraphResult<EdgeKey> {
        self.insert_edge(EdgeInput::Pair(u.into(), v.into()))
    }

    /// Add an edge with attributes. On a simple graph an existing edge has
    /// `attrs` merged into its shared bag.
    pub fn add_edge_with_attrs(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        attrs: AttrBag,
    ) -> GraphResult<EdgeKey> {
        self.insert_edge(EdgeInput::WithAttrs(u.into(), v.into(), attrs))
    }

    /// Add or update the parallel edge `key` of a multigraph.
    pub fn add_keyed_edge(
        &mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
        key: EdgeKey,
        attrs: AttrBag,
    ) -> GraphResult<EdgeKey> {
        self.insert_edge(EdgeInput::Full(u.into(), v.into(), key, attrs))
    }

    fn insert_edge(&mut self, edge: EdgeInput) -> GraphResult<EdgeKey> {
        validate_edge(self.kind, &self.policy.admit("add_edge"), &edge)?;
        let (u, v, key, attrs) = edge.into_parts();
        let key = self.link(&u, &v, key, attrs);
        self.bump();
        Ok(key)
    }

    pub fn add_edges_from<I>(&mut self, edges: I) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        self.add_edges_from_with_attrs(edges, &AttrBag::new())
    }

    /// Add many edges; per-edge attributes override `common`. The batch is
    /// validated as a whole before any edge is added.
    pub fn add_edges_from_with_attrs<I>(
        &mut self,
        edges: I,
        common: &AttrBag,
    ) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        let batch: Vec<EdgeInput> = edges.into_iter().map(Into::into).collect();
        validate_batch(self.kind, &self.policy.admit("add_edges_from"), &batch)?;
        Ok(self.commit_edges(batch, common))
    }

    /// Add edges given as dynamic tuples, disambiguated by arity.
    ///
    /// See [`EdgeInput::from_tuple`] for the accepted shapes.
    pub fn add_edges_from_values<I>(&mut self, tuples: I) -> GraphResult<Vec<EdgeKey>>
    where
        I: IntoIterator<Item = AttrValue>,
    {
        let multi = self.kind.multi;
        let batch = {
            let mut adm = self.policy.admit("add_edges_from");
            let batch = tuples
                .into_iter()
                .enumerate()
                .map(|(i, tuple)| {
                    EdgeInput::from_tuple(&tuple, multi, &mut adm).map_err(|err| err.at_item(i))
                })
                .collect::<GraphResult<Vec<_>>>()?;
            validate_batch(self.kind, &adm, &batch)?;
            batch
        };
        Ok(self.commit_edges(batch, &AttrBag::new()))
    }

    /// Add `(u, v, weight)` triples, storing the weight under `weight_name`.
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
        self.add_edges_from(edges.into_iter().map(|(u, v, w)| {
            let mut attrs = AttrBag::new();
            attrs.insert(weight_name, w);
            EdgeInput::WithAttrs(u.into(), v.into(), attrs)
        }))
    }

    fn commit_edges(&mut self, batch: Vec<EdgeInput>, common: &AttrBag) -> Vec<EdgeKey> {
        if batch.is_empty() {
            return Vec::new();
        }
        let keys = self.apply_edges(batch, common);
        self.bump();
        keys
    }

    /// Remove one edge.
    ///
    /// On a multigraph `key = None` removes the most recently inserted
    /// live key of the pair. Returns the key removed.
    pub fn remove_edge(
        &mut self,
        u: &NodeId,
        v: &NodeId,
        key: Option<EdgeKey>,
    ) -> GraphResult<EdgeKey> {
        {
            let adm = self.policy.admit("remove_edge");
            adm.node(u)?;
            adm.node(v)?;
        }
        match self.resolve_key(u, v, key) {
            Some(found) => {
                self.unlink(u, v, found);
                self.bump();
                Ok(found)
            }
            None => Err(self.policy.admit("remove_edge").missing_edge(u, v, key)),
        }
    }

    /// Remove every listed edge that exists; absent edges are skipped.
    /// Attributes carried by the inputs are ignored.
    ///
    /// Returns the number of edges removed.
    pub fn remove_edges_from<I>(&mut self, edges: I) -> usize
    where
        I: IntoIterator,
        I::Item: Into<EdgeInput>,
    {
        let mut removed = 0;
        for edge in edges {
            let edge = edge.into();
            let (u, v) = edge.endpoints();
            if let Some(found) = self.resolve_key(u, v, edge.key()) {
                let (u, v) = (u.clone(), v.clone());
                self.unlink(&u, &v, found);
                removed += 1;
            }
        }
        if removed > 0 {
            self.bump();
        }
        removed
    }

    /// Merge nodes, edges and graph attributes from `source`.
    ///
    /// Fails with `EmptyUpdate` when `source` supplies neither nodes nor
    /// edges. `graph_attrs` is merged after any graph attributes of a
    /// graph source.
    pub fn update(
        &mut self,
        source: UpdateSource<'_>,
        graph_attrs: Option<AttrBag>,
    ) -> GraphResult<()> {
        let (nodes, edges, mut attrs) = match source {
            UpdateSource::Graph(other) => {
                let keep_keys = self.kind.multi && other.kind.multi;
                let nodes: Vec<NodeInput> = other
                    .nodes
                    .iter()
                    .map(|(id, attrs)| NodeInput::WithAttrs(id.clone(), attrs.clone()))
                    .collect();
                let edges: Vec<EdgeInput> = other
                    .edge_iter()
                    .map(|edge| {
                        let data = edge.data();
                        match edge.key {
                            Some(key) if keep_keys => {
                                EdgeInput::Full(edge.source, edge.target, key, data)
                            }
                            _ => EdgeInput::WithAttrs(edge.source, edge.target, data),
                        }
                    })
                    .collect();
                (nodes, edges, vec![other.graph_attrs.clone()])
            }
            UpdateSource::Parts { nodes: None, edges: None } => {
                return Err(self.policy.admit("update").empty_update());
            }
            UpdateSource::Parts { nodes, edges } => {
                (nodes.unwrap_or_default(), edges.unwrap_or_default(), Vec::new())
            }
        };
        attrs.extend(graph_attrs);
        {
            let adm = self.policy.admit("update");
            adm.nodes(nodes.iter().map(NodeInput::id))?;
            validate_batch(self.kind, &adm, &edges)?;
        }
        self.apply_nodes(nodes, &AttrBag::new());
        self.apply_edges(edges, &AttrBag::new());
        for bag in attrs {
            self.graph_attrs.merge_owned(bag);
        }
        self.bump();
        Ok(())
    }

    /// Remove all nodes, edges and graph attributes. Key counters persist.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.succ.clear();
        self.pred.clear();
        self.graph_attrs.clear();
        self.keys.release_all();
        self.bump();
    }

    /// Remove all edges, keeping nodes and attributes.
    pub fn clear_edges(&mut self) {
        for row in self.succ.values_mut().chain(self.pred.values_mut()) {
            row.clear();
        }
        self.keys.release_all();
        self.bump();
    }

    // ============================================================
    // Attribute mutation through the store
    // ============================================================

    /// Set a node attribute, returning the value it replaced
    pub fn set_node_attr(
        &mut self,
        id: &NodeId,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<Option<AttrValue>> {
        let old = self.node_attrs_mut(id)?.insert(name, value);
        Ok(old)
    }

    /// Mutable access to a node's bag; counts as a mutation.
    pub fn node_attrs_mut(&mut self, id: &NodeId) -> GraphResult<&mut AttrBag> {
        if !self.nodes.contains_key(id) {
            return Err(self.policy.admit("node_attrs_mut").missing_node(id));
        }
        self.bump();
        self.nodes
            .get_mut(id)
            .ok_or_else(|| self.policy.admit("node_attrs_mut").missing_node(id))
    }

    /// Set an attribute on an existing edge; counts as a mutation.
    pub fn set_edge_attr(
        &mut self,
        u: &NodeId,
        v: &NodeId,
        key: Option<EdgeKey>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<Option<AttrValue>> {
        let handle = self
            .edge_attrs(u, v, key)
            .ok_or_else(|| self.policy.admit("set_edge_attr").missing_edge(u, v, key))?;
        let old = handle.write().insert(name, value);
        self.bump();
        Ok(old)
    }

    pub fn set_graph_attr(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.bump();
        self.graph_attrs.insert(name, value)
    }

    pub fn graph_attrs_mut(&mut self) -> &mut AttrBag {
        self.bump();
        &mut self.graph_attrs
    }

    // ============================================================
    // Read surface
    // ============================================================

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        if self.kind.directed {
            self.succ.values().flat_map(|row| row.values()).map(|keys| keys.len()).sum()
        } else {
            self.succ.iter().map(|(id, row)| row_degree(id, row)).sum::<usize>() / 2
        }
    }

    pub fn node_attrs(&self, id: &NodeId) -> Option<&AttrBag> {
        self.nodes.get(id)
    }

    pub fn graph_attrs(&self) -> &AttrBag {
        &self.graph_attrs
    }

    /// Live view of the nodes in insertion order
    pub fn nodes(&self) -> NodeView<'_> {
        NodeView::new(self)
    }

    /// Live view of the edges in insertion order
    pub fn edges(&self) -> EdgeView<'_> {
        EdgeView::new(self)
    }

    /// Neighbors of `node` (successors on directed stores)
    pub fn neighbors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.neighbor_view("neighbors", node, Direction::Out)
    }

    pub fn successors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.neighbor_view("successors", node, Direction::Out)
    }

    /// Predecessors of `node`; same as neighbors on undirected stores
    pub fn predecessors(&self, node: &NodeId) -> GraphResult<NeighborView<'_>> {
        self.neighbor_view("predecessors", node, Direction::In)
    }

    fn neighbor_view(
        &self,
        op: &'static str,
        node: &NodeId,
        direction: Direction,
    ) -> GraphResult<NeighborView<'_>> {
        NeighborView::new(self, node, direction)
            .ok_or_else(|| self.policy.admit(op).missing_node(node))
    }

    /// Check whether an edge exists. With `key = None` any parallel edge
    /// matches; on simple graphs only the implicit key matches.
    pub fn has_edge(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        self.key_map(u, v).map_or(false, |keys| match key {
            Some(key) => keys.contains_key(&key),
            None => !keys.is_empty(),
        })
    }

    /// Number of parallel edges between `u` and `v`
    pub fn number_of_edges_between(&self, u: &NodeId, v: &NodeId) -> usize {
        self.key_map(u, v).map_or(0, |keys| keys.len())
    }

    /// Keys of the parallel edges between `u` and `v`, oldest first
    pub fn edge_keys(&self, u: &NodeId, v: &NodeId) -> Vec<EdgeKey> {
        self.key_map(u, v)
            .map(|keys| keys.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Shared attribute handle of an edge.
    ///
    /// On a multigraph `key = None` selects the oldest parallel edge.
    pub fn edge_attrs(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> Option<SharedAttrs> {
        let keys = self.key_map(u, v)?;
        match key {
            Some(key) => keys.get(&key).cloned(),
            None => keys.first().map(|(_, attrs)| Arc::clone(attrs)),
        }
    }

    /// Snapshot copy of an edge's attributes
    pub fn get_edge_data(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> Option<AttrBag> {
        self.edge_attrs(u, v, key).map(|attrs| attrs.read().clone())
    }

    /// Key the next keyless `add_edge(u, v)` would receive
    pub fn new_edge_key(&self, u: &NodeId, v: &NodeId) -> EdgeKey {
        if self.kind.multi {
            self.keys.peek(u, v)
        } else {
            EdgeKey::IMPLICIT
        }
    }

    /// Degree of `node`; a self-loop counts twice
    pub fn degree(&self, node: &NodeId) -> GraphResult<usize> {
        let out = self
            .succ
            .get(node)
            .ok_or_else(|| self.policy.admit("degree").missing_node(node))?;
        if self.kind.directed {
            let incoming = self.pred.get(node).map_or(0, row_size);
            Ok(row_size(out) + incoming)
        } else {
            Ok(row_degree(node, out))
        }
    }

    pub fn in_degree(&self, node: &NodeId) -> GraphResult<usize> {
        if !self.kind.directed {
            return self.degree(node);
        }
        self.pred
            .get(node)
            .map(row_size)
            .ok_or_else(|| self.policy.admit("in_degree").missing_node(node))
    }

    pub fn out_degree(&self, node: &NodeId) -> GraphResult<usize> {
        if !self.kind.directed {
            return self.degree(node);
        }
        self.succ
            .get(node)
            .map(row_size)
            .ok_or_else(|| self.policy.admit("out_degree").missing_node(node))
    }

    pub fn number_of_selfloops(&self) -> usize {
        self.succ
            .iter()
            .filter_map(|(id, row)| row.get(id))
            .map(|keys| keys.len())
            .sum()
    }

    /// Check invariants: endpoints exist, mirrors agree and share bags,
    /// and multigraph key bookkeeping matches the adjacency.
    ///
    /// Returns a description of every violation found; empty when healthy.
    pub fn integrity_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if !self.nodes.keys().eq(self.succ.keys()) {
            violations.push("succ rows differ from the node table".to_string());
        }
        if self.kind.directed && !self.nodes.keys().eq(self.pred.keys()) {
            violations.push("pred rows differ from the node table".to_string());
        }
        let mirror = if self.kind.directed { &self.pred } else { &self.succ };
        for (u, row) in &self.succ {
            for (v, keys) in row {
                if !self.nodes.contains_key(v) {
                    violations.push(format!("edge {}-{} points at a missing node", u, v));
                }
                if keys.is_empty() {
                    violations.push(format!("edge {}-{} has an empty key map", u, v));
                }
                for (key, attrs) in keys {
                    let twin = mirror.get(v).and_then(|r| r.get(u)).and_then(|k| k.get(key));
                    match twin {
                        Some(twin) if Arc::ptr_eq(twin, attrs) => {}
                        Some(_) => violations
                            .push(format!("edge {}-{} key {} mirrors a different bag", u, v, key)),
                        None => {
                            violations.push(format!("edge {}-{} key {} has no mirror", u, v, key))
                        }
                    }
                }
                if self.kind.multi {
                    let tracked = self.keys.live_keys(u, v);
                    if !keys.keys().eq(tracked.iter()) {
                        violations
                            .push(format!("edge {}-{} keys disagree with the allocator", u, v));
                    }
                }
            }
        }
        if self.kind.directed {
            for (v, row) in &self.pred {
                for (u, keys) in row {
                    for key in keys.keys() {
                        if !self.has_edge(u, v, Some(*key)) {
                            violations.push(format!(
                                "pred entry {}-{} key {} has no succ twin",
                                u, v, key
                            ));
                        }
                    }
                }
            }
        }
        violations
    }

    // ============================================================
    // Internals shared with views and conversions
    // ============================================================

    pub(crate) fn node_table(&self) -> &FxIndexMap<NodeId, AttrBag> {
        &self.nodes
    }

    /// Adjacency table read for `direction`; undirected stores only have
    /// `succ`.
    pub(crate) fn adjacency(&self, direction: Direction) -> &AdjTable {
        match direction {
            Direction::In if self.kind.directed => &self.pred,
            _ => &self.succ,
        }
    }

    pub(crate) fn key_map(&self, u: &NodeId, v: &NodeId) -> Option<&KeyMap> {
        self.succ.get(u)?.get(v)
    }

    /// Parallel edges from `u` to `v`, oriented `u -> v`
    pub(crate) fn edges_between(&self, u: &NodeId, v: &NodeId) -> Vec<Edge> {
        let multi = self.kind.multi;
        self.key_map(u, v)
            .map(|keys| {
                keys.iter()
                    .map(|(key, attrs)| Edge {
                        source: u.clone(),
                        target: v.clone(),
                        key: multi.then_some(*key),
                        attrs: Arc::clone(attrs),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edges in canonical order: rows in node order, neighbors in insertion
    /// order, keys in insertion order. Undirected edges are reported once,
    /// from the endpoint that was inserted first.
    pub(crate) fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        let directed = self.kind.directed;
        let multi = self.kind.multi;
        self.succ.iter().enumerate().flat_map(move |(i, (u, row))| {
            row.iter()
                .filter(move |(v, _)| {
                    directed || self.succ.get_index_of(*v).map_or(false, |j| j >= i)
                })
                .flat_map(move |(v, keys)| {
                    keys.iter().map(move |(key, attrs)| Edge {
                        source: u.clone(),
                        target: v.clone(),
                        key: multi.then_some(*key),
                        attrs: Arc::clone(attrs),
                    })
                })
        })
    }

    /// Empty store of `kind` sharing this store's policy
    pub(crate) fn blank_like(&self, kind: GraphKind) -> GraphStore {
        GraphStore::with_policy(kind, self.policy.clone())
    }

    /// Create the node if absent. Node table and adjacency rows are always
    /// inserted together so they share one order.
    pub(crate) fn ensure_node(&mut self, id: &NodeId) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.nodes.insert(id.clone(), AttrBag::new());
        self.succ.insert(id.clone(), AdjRow::default());
        if self.kind.directed {
            self.pred.insert(id.clone(), AdjRow::default());
        }
        true
    }

    pub(crate) fn put_node(&mut self, id: NodeId, attrs: Option<AttrBag>) {
        self.ensure_node(&id);
        if let (Some(attrs), Some(bag)) = (attrs, self.nodes.get_mut(&id)) {
            bag.merge_owned(attrs);
        }
    }

    fn apply_nodes(&mut self, batch: Vec<NodeInput>, common: &AttrBag) {
        for item in batch {
            let (id, attrs) = item.into_parts();
            let mut bag = common.clone();
            if let Some(attrs) = attrs {
                bag.merge_owned(attrs);
            }
            self.put_node(id, Some(bag));
        }
    }

    fn apply_edges(&mut self, batch: Vec<EdgeInput>, common: &AttrBag) -> Vec<EdgeKey> {
        batch
            .into_iter()
            .map(|edge| {
                let (u, v, key, attrs) = edge.into_parts();
                let mut bag = common.clone();
                if let Some(attrs) = attrs {
                    bag.merge_owned(attrs);
                }
                self.link(&u, &v, key, Some(bag))
            })
            .collect()
    }

    /// Insert or update one edge, writing both mirrors.
    ///
    /// Simple graphs always use the implicit key. Multigraphs allocate a
    /// key when none is given and register an explicit one. An existing
    /// edge has `attrs` merged into its shared bag.
    pub(crate) fn link(
        &mut self,
        u: &NodeId,
        v: &NodeId,
        key: Option<EdgeKey>,
        attrs: Option<AttrBag>,
    ) -> EdgeKey {
        self.ensure_node(u);
        self.ensure_node(v);
        let key = match (self.kind.multi, key) {
            (false, _) => EdgeKey::IMPLICIT,
            (true, Some(key)) => {
                self.keys.register(u, v, key);
                key
            }
            (true, None) => self.keys.allocate(u, v),
        };
        if let Some(existing) = self.key_map(u, v).and_then(|keys| keys.get(&key)) {
            if let Some(attrs) = attrs {
                existing.write().merge_owned(attrs);
            }
            return key;
        }
        let handle = share(attrs.unwrap_or_default());
        adj_insert(&mut self.succ, u, v, key, Arc::clone(&handle));
        if self.kind.directed {
            adj_insert(&mut self.pred, v, u, key, handle);
        } else if u != v {
            adj_insert(&mut self.succ, v, u, key, handle);
        }
        key
    }

    /// Erase one edge from both mirrors and release its key.
    pub(crate) fn unlink(&mut self, u: &NodeId, v: &NodeId, key: EdgeKey) -> Option<SharedAttrs> {
        let handle = adj_remove(&mut self.succ, u, v, key)?;
        if self.kind.directed {
            adj_remove(&mut self.pred, v, u, key);
        } else if u != v {
            adj_remove(&mut self.succ, v, u, key);
        }
        if self.kind.multi {
            self.keys.release(u, v, key);
        }
        Some(handle)
    }

    /// Key a removal or lookup of `(u, v, key)` refers to, if the edge
    /// exists. Keyless multigraph lookups resolve LIFO.
    fn resolve_key(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> Option<EdgeKey> {
        let keys = self.key_map(u, v)?;
        match key {
            Some(key) => keys.contains_key(&key).then_some(key),
            None if self.kind.multi => self.keys.most_recent(u, v),
            None => Some(EdgeKey::IMPLICIT),
        }
    }

    /// Remove a node with all incident edges from every table.
    fn detach_node(&mut self, id: &NodeId) -> Option<AttrBag> {
        let attrs = self.nodes.shift_remove(id)?;
        let outgoing = self.succ.shift_remove(id).unwrap_or_default();
        let incoming = self.pred.shift_remove(id).unwrap_or_default();
        let mirror = if self.kind.directed { &mut self.pred } else { &mut self.succ };
        for nbr in outgoing.keys().filter(|nbr| *nbr != id) {
            if let Some(row) = mirror.get_mut(nbr) {
                row.shift_remove(id);
            }
        }
        for nbr in incoming.keys().filter(|nbr| *nbr != id) {
            if let Some(row) = self.succ.get_mut(nbr) {
                row.shift_remove(id);
            }
        }
        if self.kind.multi {
            for (nbr, keys) in &outgoing {
                for key in keys.keys() {
                    self.keys.release(id, nbr, *key);
                }
            }
            for (nbr, keys) in &incoming {
                for key in keys.keys() {
                    self.keys.release(nbr, id, *key);
                }
            }
        }
        Some(attrs)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(GraphKind::UNDIRECTED)
    }
}

/// Structural checks every edge input must pass before a batch is applied.
pub(crate) fn validate_edge(
    kind: GraphKind,
    adm: &Admission<'_>,
    edge: &EdgeInput,
) -> GraphResult<()> {
    let (u, v) = edge.endpoints();
    adm.node(u)?;
    adm.node(v)?;
    if let (Some(key), false) = (edge.key(), kind.multi) {
        return Err(adm.arity(
            edge.arity(),
            format!("edge {}-{} carries key {} on a non-multigraph", u, v, key),
        ));
    }
    Ok(())
}

/// [`validate_edge`] over a whole batch, tagging the first failure with
/// its position.
fn validate_batch(kind: GraphKind, adm: &Admission<'_>, batch: &[EdgeInput]) -> GraphResult<()> {
    batch
        .iter()
        .enumerate()
        .try_for_each(|(i, edge)| validate_edge(kind, adm, edge).map_err(|err| err.at_item(i)))
}

fn adj_insert(table: &mut AdjTable, a: &NodeId, b: &NodeId, key: EdgeKey, handle: SharedAttrs) {
    table
        .entry(a.clone())
        .or_default()
        .entry(b.clone())
        .or_default()
        .insert(key, handle);
}

fn adj_remove(table: &mut AdjTable, a: &NodeId, b: &NodeId, key: EdgeKey) -> Option<SharedAttrs> {
    let row = table.get_mut(a)?;
    let keys = row.get_mut(b)?;
    let handle = keys.shift_remove(&key)?;
    if keys.is_empty() {
        row.shift_remove(b);
    }
    Some(handle)
}

fn row_size(row: &AdjRow) -> usize {
    row.values().map(|keys| keys.len()).sum()
}

/// Undirected degree of the node owning `row`; self-loops count twice.
fn row_degree(node: &NodeId, row: &AdjRow) -> usize {
    row.iter()
        .map(|(nbr, keys)| if nbr == node { 2 * keys.len() } else { keys.len() })
        .sum()
}
