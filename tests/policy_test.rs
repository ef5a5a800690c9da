//! Integration tests for the strict / hardened policy gate
//!
//! Each recovery is exercised once inside the budget and once beyond it,
//! and every fail-closed path is compared across both modes.

use compatgraph::graph::{bulk, AttrValue, ErrorKind, GraphKind, GraphStore, NodeId};
use compatgraph::policy::{PolicyConfig, PolicyEngine, PolicyMode, Recovery};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn swapped_tuple(key: i64) -> AttrValue {
    AttrValue::Array(vec![
        "a".into(),
        "b".into(),
        AttrValue::Map([("w", 1)].into_iter().collect()),
        key.into(),
    ])
}

#[test]
fn test_null_rejected_identically() {
    for policy in [PolicyEngine::strict(), PolicyEngine::hardened()] {
        let mode = policy.mode();
        let mut store = GraphStore::with_policy(GraphKind::UNDIRECTED, policy);
        let err = store.add_node(NodeId::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullIdentifier);
        assert_eq!(err.mode(), mode);
        assert_eq!(err.to_string(), format!("add_node: null node identifier rejected [{}]", mode));
    }
}

#[test]
fn test_tuple_order_recovery_hardened_only() {
    init_logging();
    let mut strict = GraphStore::with_policy(GraphKind::MULTI_DIRECTED, PolicyEngine::strict());
    let err = strict.add_edges_from_values(vec![swapped_tuple(3)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arity);

    let mut hardened = GraphStore::with_policy(GraphKind::MULTI_DIRECTED, PolicyEngine::hardened());
    let keys = hardened.add_edges_from_values(vec![swapped_tuple(3)]).unwrap();
    assert_eq!(keys.len(), 1);
    assert!(hardened.has_edge(&NodeId::from("a"), &NodeId::from("b"), Some(keys[0])));
}

#[test]
fn test_budget_is_per_request() {
    let mut hardened = GraphStore::with_policy(GraphKind::MULTI_DIRECTED, PolicyEngine::hardened());

    // Two repairs in one request exceed the budget and nothing is applied.
    let err = hardened
        .add_edges_from_values(vec![swapped_tuple(1), swapped_tuple(2)])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arity);
    assert_eq!(hardened.edge_count(), 0);

    // Separate requests each get their own budget.
    hardened.add_edges_from_values(vec![swapped_tuple(1)]).unwrap();
    hardened.add_edges_from_values(vec![swapped_tuple(2)]).unwrap();
    assert_eq!(hardened.edge_count(), 2);
}

#[test]
fn test_configured_budget_is_clamped() {
    init_logging();
    let config = PolicyConfig::from_yaml_str("mode: hardened\nrecovery_budget: 10\n").unwrap();
    let policy = PolicyEngine::from_config(config);
    let err = bulk::from_json_str(r#"{"a": 1, "b": 2}"#, policy).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownIncompatibleFeature);
}

#[test]
fn test_allowlist_limits_hardened_mode() {
    let policy = PolicyEngine::from_config(PolicyConfig {
        mode: PolicyMode::Hardened,
        allowlist: vec![Recovery::QuarantineUnknownField],
        recovery_budget: 1,
    });
    let mut store = GraphStore::with_policy(GraphKind::MULTI_UNDIRECTED, policy.clone());
    let err = store.add_edges_from_values(vec![swapped_tuple(0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Arity);

    let (_, report) = bulk::from_json_str(r#"{"meta": {"v": 1}}"#, policy).unwrap();
    assert_eq!(report.quarantined[0].0, "meta");
}

#[test]
fn test_negative_size_fails_in_both_modes() {
    for policy in [PolicyEngine::strict(), PolicyEngine::hardened()] {
        let err = bulk::empty_graph(GraphKind::UNDIRECTED, -3, policy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
    }
}

#[test]
fn test_malformed_multigraph_mapping_fails_in_both_modes() {
    let map = serde_json::from_str(r#"{"a": {"b": [1, 2]}}"#).unwrap();
    for policy in [PolicyEngine::strict(), PolicyEngine::hardened()] {
        let err = bulk::from_adjacency_map(GraphKind::MULTI_DIRECTED, &map, policy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
    }
}

#[test]
fn test_missing_items_not_silenced_by_hardened() {
    let mut store = GraphStore::with_policy(GraphKind::DIRECTED, PolicyEngine::hardened());
    assert_eq!(
        store.remove_node(&NodeId::from("z")).unwrap_err().kind(),
        ErrorKind::MissingNode
    );
    assert_eq!(
        store
            .remove_edge(&NodeId::from("a"), &NodeId::from("b"), None)
            .unwrap_err()
            .kind(),
        ErrorKind::MissingEdge
    );
}

#[test]
fn test_policy_survives_copy() {
    let store = GraphStore::with_policy(GraphKind::DIRECTED, PolicyEngine::hardened());
    assert_eq!(store.copy().mode(), PolicyMode::Hardened);
    assert_eq!(store.to_undirected(false).mode(), PolicyMode::Hardened);
}
