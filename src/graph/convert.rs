//! Copies and kind conversions
//!
//! Every conversion produces an independent store: fresh identity,
//! revision 0, deep-copied attribute bags. Multigraph key counters are
//! carried over so keys retired in the source are not reissued.

use super::error::GraphResult;
use super::store::GraphStore;
use super::types::{EdgeKey, GraphKind};
use std::sync::Arc;
use tracing::debug;

impl GraphStore {
    /// New store of `kind` with this store's policy, graph attributes and
    /// nodes, and no edges.
    fn skeleton(&self, kind: GraphKind) -> GraphStore {
        let mut out = self.blank_like(kind);
        out.graph_attrs = self.graph_attrs.clone();
        for (id, attrs) in &self.nodes {
            out.put_node(id.clone(), Some(attrs.clone()));
        }
        out
    }

    /// Copy every adjacency entry as-is. On undirected sources this visits
    /// each edge from both endpoints; `link` folds the second visit into
    /// the first.
    fn copy_adjacency_into(&self, out: &mut GraphStore) {
        for (u, row) in &self.succ {
            for (v, keys) in row {
                for (key, attrs) in keys {
                    let key = self.kind.multi.then_some(*key);
                    out.link(u, v, key, Some(attrs.read().clone()));
                }
            }
        }
    }

    /// Deep copy: same kind, nodes, edges, keys and attributes, with no
    /// storage shared with `self`.
    pub fn copy(&self) -> GraphStore {
        let mut out = self.skeleton(self.kind);
        self.copy_adjacency_into(&mut out);
        out.keys.absorb_counters(&self.keys, false);
        debug!(
            "Copied {} store: {} nodes, {} edges",
            self.kind,
            out.node_count(),
            out.edge_count()
        );
        out
    }

    /// Directed copy. Each undirected edge becomes two opposite edges that
    /// keep the original key and carry independent attribute bags.
    pub fn to_directed(&self) -> GraphStore {
        let mut out = self.skeleton(self.kind.with_directed(true));
        self.copy_adjacency_into(&mut out);
        out.keys.absorb_counters(&self.keys, false);
        debug!(
            "Converted {} store to directed: {} edges -> {}",
            self.kind,
            self.edge_count(),
            out.edge_count()
        );
        out
    }

    /// Undirected copy.
    ///
    /// Opposite directed edges with the same key collapse into one edge;
    /// the first one in edge order provides the attributes. With
    /// `reciprocal` an edge is kept only when its reverse also exists.
    pub fn to_undirected(&self, reciprocal: bool) -> GraphStore {
        let mut out = self.skeleton(self.kind.with_directed(false));
        if !self.kind.directed {
            self.copy_adjacency_into(&mut out);
        } else {
            for edge in self.edge_iter() {
                if reciprocal && !self.has_edge(&edge.target, &edge.source, None) {
                    continue;
                }
                let key = edge.key.unwrap_or(EdgeKey::IMPLICIT);
                if out.has_edge(&edge.source, &edge.target, Some(key)) {
                    continue;
                }
                out.link(&edge.source, &edge.target, edge.key, Some(edge.data()));
            }
        }
        out.keys.absorb_counters(&self.keys, false);
        debug!(
            "Converted {} store to undirected (reciprocal={}): {} edges -> {}",
            self.kind,
            reciprocal,
            self.edge_count(),
            out.edge_count()
        );
        out
    }

    /// Reversed copy of a directed store; every `u -> v` becomes `v -> u`
    /// with the same key and a copied bag.
    ///
    /// For a live reversed projection use
    /// [`reverse_view`](GraphStore::reverse_view).
    pub fn reverse(&self) -> GraphResult<GraphStore> {
        if !self.kind.directed {
            return Err(self
                .policy
                .admit("reverse")
                .unsupported("reverse is only defined for directed graphs"));
        }
        let mut out = self.skeleton(self.kind);
        for edge in self.edge_iter() {
            out.link(&edge.target, &edge.source, edge.key, Some(edge.data()));
        }
        out.keys.absorb_counters(&self.keys, true);
        debug!("Reversed {} store with {} edges", self.kind, out.edge_count());
        Ok(out)
    }

    /// True when `self` and `other` share any attribute bag.
    pub fn shares_storage_with(&self, other: &GraphStore) -> bool {
        self.edge_iter().any(|mine| {
            other
                .edge_attrs(&mine.source, &mine.target, mine.key)
                .map_or(false, |theirs| Arc::ptr_eq(&mine.attrs, &theirs))
        })
    }
}
