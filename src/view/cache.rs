//! Revision-keyed cached projections
//!
//! A [`CachedView`] keeps one materialized projection of a store together
//! with the store identity and revision it was computed at. Every read
//! passes the store in and is checked against both. A mismatch recomputes
//! before anything is returned, so a stale payload is never served. The
//! cache holds no borrow of the store.

use crate::graph::{Edge, GraphResult, GraphStore, NodeId};
use std::fmt;
use tracing::{debug, trace};

type Projection<T> = Box<dyn Fn(&GraphStore) -> T + Send + Sync>;

struct Snapshot<T> {
    store_id: u64,
    revision: u64,
    payload: T,
}

impl<T> Snapshot<T> {
    fn is_current(&self, store: &GraphStore) -> bool {
        self.store_id == store.store_id() && self.revision == store.revision()
    }
}

/// Cached projection of a store, recomputed whenever the store's revision
/// moves.
pub struct CachedView<T> {
    name: &'static str,
    project: Projection<T>,
    snapshot: Option<Snapshot<T>>,
    hits: u64,
    misses: u64,
}

impl<T> CachedView<T> {
    pub fn new(
        name: &'static str,
        project: impl Fn(&GraphStore) -> T + Send + Sync + 'static,
    ) -> Self {
        CachedView {
            name,
            project: Box::new(project),
            snapshot: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Read the projection of `store`, recomputing it if the cached copy
    /// belongs to another store or an older revision.
    pub fn read(&mut self, store: &GraphStore) -> &T {
        let snapshot = match self.snapshot.take() {
            Some(snapshot) if snapshot.is_current(store) => {
                self.hits += 1;
                trace!("Cache hit for {} at revision {}", self.name, snapshot.revision);
                snapshot
            }
            previous => {
                self.misses += 1;
                debug!(
                    "Recomputing {} for store {} at revision {} (cached: {:?})",
                    self.name,
                    store.store_id(),
                    store.revision(),
                    previous.map(|s| s.revision)
                );
                Snapshot {
                    store_id: store.store_id(),
                    revision: store.revision(),
                    payload: (self.project)(store),
                }
            }
        };
        &self.snapshot.insert(snapshot).payload
    }

    /// Whether the next [`read`](Self::read) of `store` would be a hit
    pub fn is_fresh(&self, store: &GraphStore) -> bool {
        self.snapshot.as_ref().map_or(false, |s| s.is_current(store))
    }

    /// Revision the cached payload was computed at
    pub fn cached_revision(&self) -> Option<u64> {
        self.snapshot.as_ref().map(|s| s.revision)
    }

    /// Drop the cached payload
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl CachedView<Vec<NodeId>> {
    /// Node list in insertion order
    pub fn nodes() -> Self {
        CachedView::new("nodes", |store| store.nodes().to_vec())
    }
}

impl CachedView<Vec<Edge>> {
    /// Edge list in canonical order. Cached edges hold live attribute
    /// handles.
    pub fn edges() -> Self {
        CachedView::new("edges", |store| store.edges().to_vec())
    }
}

impl CachedView<GraphResult<Vec<NodeId>>> {
    /// Neighbors of one node; a missing node is cached as the error.
    pub fn neighbors(node: NodeId) -> Self {
        CachedView::new("neighbors", move |store| {
            store.neighbors(&node).map(|view| view.to_vec())
        })
    }
}

impl<T> fmt::Debug for CachedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedView")
            .field("name", &self.name)
            .field("cached_revision", &self.cached_revision())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_until_mutation() {
        let mut store = GraphStore::undirected();
        store.add_node("a").unwrap();
        let mut cache = CachedView::nodes();

        assert_eq!(cache.read(&store).len(), 1);
        assert_eq!(cache.read(&store).len(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        store.add_node("b").unwrap();
        assert!(!cache.is_fresh(&store));
        assert_eq!(cache.read(&store).len(), 2);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_other_store_same_revision_misses() {
        let mut first = GraphStore::undirected();
        first.add_node("a").unwrap();
        let mut second = GraphStore::undirected();
        second.add_node("z").unwrap();
        assert_eq!(first.revision(), second.revision());

        let mut cache = CachedView::nodes();
        assert_eq!(cache.read(&first), &vec![NodeId::from("a")]);
        assert_eq!(cache.read(&second), &vec![NodeId::from("z")]);
    }

    #[test]
    fn test_invalidate() {
        let store = GraphStore::directed();
        let mut cache = CachedView::edges();
        cache.read(&store);
        cache.invalidate();
        assert_eq!(cache.cached_revision(), None);
        assert!(cache.read(&store).is_empty());
        assert_eq!(cache.misses(), 2);
    }
}
