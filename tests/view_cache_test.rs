//! Integration tests for live views and revision-keyed caches

use compatgraph::graph::{EdgeKey, GraphStore, NodeId};
use compatgraph::view::{CachedView, GraphRead};

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

#[test]
fn test_views_are_recomputed_per_access() {
    let mut store = GraphStore::directed();
    store.add_edge("a", "b").unwrap();
    assert_eq!(store.edges().len(), 1);

    store.add_edge("b", "c").unwrap();
    assert_eq!(store.edges().len(), 2);
    assert_eq!(store.nodes().to_vec(), vec![id("a"), id("b"), id("c")]);
}

#[test]
fn test_cached_node_view_sees_new_node() {
    let mut store = GraphStore::undirected();
    store.add_nodes_from(vec!["a", "b"]).unwrap();
    let mut cache = CachedView::nodes();
    assert!(!cache.read(&store).contains(&id("x")));

    store.add_node("x").unwrap();
    assert!(cache.read(&store).contains(&id("x")));
}

#[test]
fn test_cache_never_older_than_store() {
    let mut store = GraphStore::multi_undirected();
    let mut cache = CachedView::edges();
    for round in 0..5u64 {
        store.add_edge("a", "b").unwrap();
        let revision = store.revision();
        let edges = cache.read(&store);
        assert_eq!(edges.len() as u64, round + 1);
        assert_eq!(cache.cached_revision(), Some(revision));
    }
    assert_eq!(cache.misses(), 5);
    assert_eq!(cache.hits(), 0);
}

#[test]
fn test_cache_hits_across_pure_reads() {
    let mut store = GraphStore::directed();
    store.add_edges_from(vec![("a", "b"), ("a", "c")]).unwrap();
    let mut cache = CachedView::neighbors(id("a"));
    for _ in 0..4 {
        let _ = store.degree(&id("a"));
        assert_eq!(cache.read(&store).as_ref().unwrap().len(), 2);
    }
    assert_eq!((cache.misses(), cache.hits()), (1, 3));
}

#[test]
fn test_cached_neighbors_of_missing_node() {
    let mut store = GraphStore::undirected();
    let mut cache = CachedView::neighbors(id("late"));
    assert!(cache.read(&store).is_err());

    store.add_edge("late", "b").unwrap();
    assert_eq!(cache.read(&store).as_ref().unwrap(), &vec![id("b")]);
}

#[test]
fn test_custom_projection_over_copy() {
    let mut store = GraphStore::undirected();
    store.add_edge("a", "b").unwrap();
    let copy = store.copy();

    let mut count = CachedView::new("edge_count", |g: &GraphStore| g.edge_count());
    assert_eq!(*count.read(&store), 1);
    // Switching to another store always recomputes.
    store.add_edge("b", "c").unwrap();
    assert_eq!(*count.read(&copy), 1);
    assert_eq!(*count.read(&store), 2);
    assert_eq!(count.misses(), 3);
}

#[test]
fn test_reversed_edge_view_is_projection() {
    let mut store = GraphStore::multi_directed();
    store.add_edge("a", "b").unwrap();
    store.add_edge("a", "b").unwrap();
    let reversed = store.edges().reversed();
    let edges = reversed.to_vec();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.source == id("b") && e.target == id("a")));
    assert_eq!(edges[1].key, Some(EdgeKey(1)));
    assert_eq!(store.edges().reversed().reversed().pairs(), store.edges().pairs());
}

#[test]
fn test_subgraph_view_tracks_store() {
    let mut store = GraphStore::undirected();
    store.add_edges_from(vec![("a", "b"), ("b", "c")]).unwrap();
    assert_eq!(store.subgraph(vec!["a", "b", "c"]).edge_count(), 2);

    store.remove_edge(&id("a"), &id("b"), None).unwrap();
    let view = store.subgraph(vec!["a", "b", "c"]);
    assert_eq!(view.edge_count(), 1);
    assert_eq!(view.revision(), store.revision());
}

#[test]
fn test_graph_read_is_uniform() {
    fn summary(g: &impl GraphRead) -> (usize, usize) {
        (g.node_count(), g.edge_count())
    }
    let mut store = GraphStore::directed();
    store.add_edges_from(vec![("a", "b"), ("b", "c"), ("c", "a")]).unwrap();
    assert_eq!(summary(&store), (3, 3));
    assert_eq!(summary(&store.subgraph(vec!["a", "b"])), (2, 1));
    let reversed = store.reverse_view().unwrap();
    assert_eq!(summary(&reversed), (3, 3));
}
