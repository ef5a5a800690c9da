//! Edge view with composable filters and orientation

use crate::graph::{Edge, EdgeKey, GraphStore, NodeId};
use std::fmt;
use std::sync::Arc;

pub(crate) type EdgePredicate<'g> = Arc<dyn Fn(&Edge) -> bool + 'g>;

/// Live view of a store's edges.
///
/// Filters see edges in the view's orientation, so a filter on a reversed
/// view tests the swapped endpoints.
#[derive(Clone)]
pub struct EdgeView<'g> {
    store: &'g GraphStore,
    predicate: Option<EdgePredicate<'g>>,
    reversed: bool,
}

impl<'g> EdgeView<'g> {
    pub(crate) fn new(store: &'g GraphStore) -> Self {
        EdgeView {
            store,
            predicate: None,
            reversed: false,
        }
    }

    /// Narrow the view; filters compose with AND.
    pub fn filter(&self, keep: impl Fn(&Edge) -> bool + 'g) -> EdgeView<'g> {
        let predicate: EdgePredicate<'g> = match self.predicate.clone() {
            Some(previous) => Arc::new(move |edge: &Edge| previous(edge) && keep(edge)),
            None => Arc::new(keep),
        };
        EdgeView {
            predicate: Some(predicate),
            ..self.clone()
        }
    }

    /// Same edges with source and target swapped
    pub fn reversed(&self) -> EdgeView<'g> {
        EdgeView {
            reversed: !self.reversed,
            ..self.clone()
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn iter(&self) -> impl Iterator<Item = Edge> + 'g {
        let reversed = self.reversed;
        let predicate = self.predicate.clone();
        self.store
            .edge_iter()
            .map(move |edge| if reversed { edge.reversed() } else { edge })
            .filter(move |edge| predicate.as_ref().map_or(true, |keep| keep(edge)))
    }

    pub fn len(&self) -> usize {
        match self.predicate {
            None => self.store.edge_count(),
            Some(_) => self.iter().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check membership in the view's orientation
    pub fn contains(&self, u: &NodeId, v: &NodeId, key: Option<EdgeKey>) -> bool {
        let (a, b) = if self.reversed { (v, u) } else { (u, v) };
        if !self.store.has_edge(a, b, key) {
            return false;
        }
        let Some(keep) = &self.predicate else {
            return true;
        };
        self.store
            .edges_between(a, b)
            .into_iter()
            .filter(|edge| key.map_or(true, |k| edge.key.unwrap_or(EdgeKey::IMPLICIT) == k))
            .map(|edge| if self.reversed { edge.reversed() } else { edge })
            .any(|edge| keep(&edge))
    }

    pub fn to_vec(&self) -> Vec<Edge> {
        self.iter().collect()
    }

    /// Endpoint pairs, one per edge (parallel edges repeat)
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.iter().map(|edge| (edge.source, edge.target)).collect()
    }
}

impl fmt::Debug for EdgeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeView")
            .field("filtered", &self.predicate.is_some())
            .field("reversed", &self.reversed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{AttrBag, EdgeKey, GraphStore, NodeId};

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn weighted() -> GraphStore {
        let mut store = GraphStore::directed();
        store
            .add_weighted_edges_from(
                vec![("a", "b", 1.0), ("b", "c", 5.0), ("c", "a", 9.0)],
                "weight",
            )
            .unwrap();
        store
    }

    fn heavy(edge: &crate::graph::Edge) -> bool {
        edge.get("weight").and_then(|w| w.as_float()).map_or(false, |w| w > 2.0)
    }

    #[test]
    fn test_filter_and_reverse() {
        let store = weighted();
        let view = store.edges().filter(heavy);
        assert_eq!(view.len(), 2);
        assert_eq!(view.pairs(), vec![(id("b"), id("c")), (id("c"), id("a"))]);

        let reversed = view.reversed();
        assert_eq!(reversed.pairs(), vec![(id("c"), id("b")), (id("a"), id("c"))]);
        assert!(reversed.contains(&id("c"), &id("b"), None));
        assert!(!reversed.contains(&id("b"), &id("a"), None));
    }

    #[test]
    fn test_filters_compose() {
        let store = weighted();
        let view = store
            .edges()
            .filter(heavy)
            .filter(|edge| edge.target != id("a"));
        assert_eq!(view.pairs(), vec![(id("b"), id("c"))]);
        assert!(!view.contains(&id("c"), &id("a"), None));
    }

    #[test]
    fn test_contains_by_key() {
        let mut store = GraphStore::multi_undirected();
        store.add_edge("a", "b").unwrap();
        store.add_keyed_edge("a", "b", EdgeKey(4), AttrBag::new()).unwrap();
        let view = store.edges().filter(|edge| edge.key == Some(EdgeKey(4)));
        assert!(view.contains(&id("b"), &id("a"), Some(EdgeKey(4))));
        assert!(!view.contains(&id("a"), &id("b"), Some(EdgeKey(0))));
    }
}
