//! Integration tests for copies and kind conversions

use compatgraph::graph::{
    bulk, AttrBag, EdgeInput, EdgeKey, ErrorKind, GraphKind, GraphStore, NodeId, UpdateSource,
};
use compatgraph::policy::PolicyEngine;

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn weight(w: i64) -> AttrBag {
    [("weight", w)].into_iter().collect()
}

#[test]
fn test_copy_then_mutate_copy() {
    let mut store = GraphStore::multi_undirected();
    store.add_edge_with_attrs("a", "b", weight(1)).unwrap();
    let mut copy = store.copy();

    copy.set_edge_attr(&id("a"), &id("b"), Some(EdgeKey(0)), "weight", 99).unwrap();
    let source = store.get_edge_data(&id("a"), &id("b"), Some(EdgeKey(0))).unwrap();
    assert_eq!(source.get("weight").unwrap().as_integer(), Some(1));
    assert_eq!(copy.revision(), 1);
    assert_eq!(store.revision(), 1);
}

#[test]
fn test_copy_preserves_order_and_keys() {
    let mut store = GraphStore::multi_directed();
    store.add_edges_from(vec![("c", "a"), ("a", "b"), ("c", "a")]).unwrap();
    store.remove_edge(&id("c"), &id("a"), Some(EdgeKey(0))).unwrap();

    let mut copy = store.copy();
    assert_eq!(copy.nodes().to_vec(), store.nodes().to_vec());
    assert_eq!(copy.edges().to_vec(), store.edges().to_vec());
    assert_eq!(copy.add_edge("c", "a").unwrap(), EdgeKey(2));
    assert_eq!(
        copy.remove_edge(&id("c"), &id("a"), None).unwrap(),
        EdgeKey(2)
    );
}

#[test]
fn test_reciprocal_conflict_first_direction_wins() {
    let mut store = GraphStore::directed();
    store.add_edge_with_attrs("a", "b", weight(1)).unwrap();
    store.add_edge_with_attrs("b", "a", weight(2)).unwrap();

    for reciprocal in [false, true] {
        let undirected = store.to_undirected(reciprocal);
        assert_eq!(undirected.edge_count(), 1);
        let data = undirected.get_edge_data(&id("a"), &id("b"), None).unwrap();
        assert_eq!(data.get("weight").unwrap().as_integer(), Some(1));
        assert!(!undirected.shares_storage_with(&store));
    }
}

#[test]
fn test_reciprocal_conflict_follows_iteration_order() {
    let mut store = GraphStore::directed();
    // "b" is inserted first, so b -> a comes first in edge order.
    store.add_node("b").unwrap();
    store.add_edge_with_attrs("a", "b", weight(1)).unwrap();
    store.add_edge_with_attrs("b", "a", weight(2)).unwrap();

    let undirected = store.to_undirected(true);
    let data = undirected.get_edge_data(&id("a"), &id("b"), None).unwrap();
    assert_eq!(data.get("weight").unwrap().as_integer(), Some(2));
}

#[test]
fn test_round_trip_directed() {
    let mut store = GraphStore::undirected();
    store.add_edges_from(vec![("a", "b"), ("b", "c"), ("c", "c")]).unwrap();
    let directed = store.to_directed();
    assert_eq!(directed.edge_count(), 5);
    assert!(directed.has_edge(&id("c"), &id("b"), None));

    let back = directed.to_undirected(true);
    assert_eq!(back.edge_count(), store.edge_count());
    assert!(back.integrity_violations().is_empty());
}

#[test]
fn test_multigraph_to_directed_keeps_keys() {
    let mut store = GraphStore::multi_undirected();
    store.add_edge("a", "b").unwrap();
    store.add_edge("b", "a").unwrap();
    let mut directed = store.to_directed();
    assert_eq!(directed.edge_keys(&id("b"), &id("a")), vec![EdgeKey(0), EdgeKey(1)]);
    assert_eq!(directed.add_edge("b", "a").unwrap(), EdgeKey(2));
    assert!(directed.integrity_violations().is_empty());
}

#[test]
fn test_reverse_copy_and_view() {
    let mut store = GraphStore::directed();
    store.add_edge_with_attrs("a", "b", weight(4)).unwrap();

    let reversed = store.reverse().unwrap();
    assert!(reversed.has_edge(&id("b"), &id("a"), None));
    assert!(!reversed.shares_storage_with(&store));

    {
        let mut view = store.reverse_view().unwrap();
        view.add_edge_with_attrs("c", "a", weight(5)).unwrap();
        assert_eq!(
            view.get_edge_data(&id("b"), &id("a"), None)
                .unwrap()
                .get("weight")
                .unwrap()
                .as_integer(),
            Some(4)
        );
    }
    assert!(store.has_edge(&id("a"), &id("c"), None));
    assert!(!reversed.has_edge(&id("c"), &id("a"), None));
}

#[test]
fn test_reverse_view_forwards_removals() {
    let mut store = GraphStore::multi_directed();
    store
        .add_edges_from(vec![("a", "b"), ("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")])
        .unwrap();

    {
        let mut view = store.reverse_view().unwrap();
        assert_eq!(view.remove_edge(&id("b"), &id("a"), None).unwrap(), EdgeKey(1));
        let removed = view.remove_edges_from(vec![
            EdgeInput::from(("c", "b")),
            EdgeInput::from(("a", "d", EdgeKey(0))),
            EdgeInput::from(("a", "b")),
        ]);
        assert_eq!(removed, 2);
        assert!(view.has_edge(&id("b"), &id("a"), Some(EdgeKey(0))));
        assert_eq!(view.neighbors(&id("d")).unwrap().to_vec(), vec![id("c")]);
    }

    assert_eq!(store.edge_count(), 2);
    assert!(store.has_edge(&id("a"), &id("b"), Some(EdgeKey(0))));
    assert!(!store.has_edge(&id("b"), &id("c"), None));
    assert!(!store.has_edge(&id("d"), &id("a"), None));
    assert!(store.has_edge(&id("c"), &id("d"), None));
    assert!(store.integrity_violations().is_empty());
}

#[test]
fn test_reverse_view_forwards_bulk_additions() {
    let mut store = GraphStore::directed();
    {
        let mut view = store.reverse_view().unwrap();
        view.add_edges_from(vec![("a", "b"), ("b", "c")]).unwrap();
        view.add_weighted_edges_from(vec![("c", "d", 2.5)], "weight").unwrap();
        view.set_edge_attr(&id("a"), &id("b"), None, "color", "red").unwrap();
        view.update(UpdateSource::edges(vec![("x", "y")]), None).unwrap();
        assert_eq!(view.remove_nodes_from(vec!["zz", "x"]), 1);
    }

    assert!(store.has_edge(&id("b"), &id("a"), None));
    assert!(store.has_edge(&id("c"), &id("b"), None));
    let data = store.get_edge_data(&id("d"), &id("c"), None).unwrap();
    assert_eq!(data.get("weight").unwrap().as_float(), Some(2.5));
    let data = store.get_edge_data(&id("b"), &id("a"), None).unwrap();
    assert_eq!(data.get("color").unwrap().as_string(), Some("red"));
    assert!(!store.has_node(&id("x")));
    assert!(store.has_node(&id("y")));
}

#[test]
fn test_reverse_of_undirected_rejected() {
    let mut store = GraphStore::undirected();
    assert_eq!(store.reverse().unwrap_err().kind(), ErrorKind::UnsupportedInput);
    assert_eq!(store.reverse_view().unwrap_err().kind(), ErrorKind::UnsupportedInput);
}

#[test]
fn test_from_edges_constructor() {
    let store = bulk::from_edges(
        GraphKind::MULTI_UNDIRECTED,
        vec![("a", "b"), ("a", "b"), ("b", "c")],
        PolicyEngine::strict(),
    )
    .unwrap();
    assert_eq!(store.edge_count(), 3);
    assert_eq!(store.revision(), 1);
}

#[test]
fn test_document_export_shape() {
    let mut store = GraphStore::directed();
    store.add_edge_with_attrs("a", "b", weight(2)).unwrap();
    let doc = bulk::to_document(&store);
    let doc = doc.as_map().unwrap();
    assert_eq!(doc.get("directed").unwrap().as_boolean(), Some(true));
    let edges = doc.get("edges").unwrap().as_array().unwrap();
    let edge = edges[0].as_map().unwrap();
    assert_eq!(edge.get("source").unwrap().as_string(), Some("a"));
    assert_eq!(edge.get("weight").unwrap().as_integer(), Some(2));
    assert!(edge.get("key").is_none());
}
