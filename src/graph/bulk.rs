//! Bulk constructors and node-link documents
//!
//! Constructors validate their whole input under one policy admission
//! before the store is built, so a rejected input leaves nothing behind.
//!
//! Document layout:
//!
//! ```json
//! {
//!   "directed": false,
//!   "multigraph": false,
//!   "graph": {"name": "g"},
//!   "nodes": [{"id": "a", "color": "red"}],
//!   "edges": [{"source": "a", "target": "b", "key": 0, "weight": 2}]
//! }
//! ```

use super::error::GraphResult;
use super::input::{EdgeInput, NodeInput};
use super::property::{AttrBag, AttrValue};
use super::store::GraphStore;
use super::types::{EdgeKey, GraphKind, NodeId};
use crate::policy::{Admission, PolicyEngine, RecoveryRecord};
use tracing::debug;

const DOCUMENT_FIELDS: [&str; 5] = ["directed", "multigraph", "graph", "nodes", "edges"];

/// What document ingest set aside or repaired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Unrecognized top-level fields, kept verbatim.
    pub quarantined: Vec<(String, AttrValue)>,
    pub recoveries: Vec<RecoveryRecord>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_empty() && self.recoveries.is_empty()
    }
}

/// Store with nodes `0..n` and no edges
pub fn empty_graph(kind: GraphKind, n: i64, policy: PolicyEngine) -> GraphResult<GraphStore> {
    let count = policy.admit("empty_graph").size_param("n", n)?;
    let mut store = GraphStore::with_policy(kind, policy);
    store.add_nodes_from((0..count as i64).map(NodeId::Int))?;
    Ok(store)
}

/// Store built from an edge list
pub fn from_edges<I>(kind: GraphKind, edges: I, policy: PolicyEngine) -> GraphResult<GraphStore>
where
    I: IntoIterator,
    I::Item: Into<EdgeInput>,
{
    let mut store = GraphStore::with_policy(kind, policy);
    store.add_edges_from(edges)?;
    Ok(store)
}

/// Store built from a nested adjacency mapping.
///
/// Simple graphs: `{u: {v: attrs}}`. Multigraphs: `{u: {v: {key: attrs}}}`
/// with keys written as decimal strings. Node ids are the mapping keys.
pub fn from_adjacency_map(
    kind: GraphKind,
    map: &AttrBag,
    policy: PolicyEngine,
) -> GraphResult<GraphStore> {
    let (nodes, edges) = {
        let adm = policy.admit("from_adjacency_map");
        let mut nodes = Vec::with_capacity(map.len());
        let mut edges = Vec::new();
        for (u_name, row) in map.iter() {
            let u = NodeId::from(u_name);
            let row = as_mapping(&adm, row, || format!("adjacency row of {}", u))?;
            for (v_name, entry) in row.iter() {
                let v = NodeId::from(v_name);
                let entry = as_mapping(&adm, entry, || format!("adjacency entry {}-{}", u, v))?;
                if !kind.multi {
                    edges.push(EdgeInput::WithAttrs(u.clone(), v.clone(), entry.clone()));
                    continue;
                }
                for (key_name, attrs) in entry.iter() {
                    let key = key_name.parse::<u64>().map_err(|_| {
                        adm.unsupported(format!(
                            "edge key `{}` of {}-{} is not an integer",
                            key_name, u, v
                        ))
                    })?;
                    let what = || format!("attributes of {}-{} key {}", u, v, key);
                    let attrs = as_mapping(&adm, attrs, what)?;
                    edges.push(EdgeInput::Full(u.clone(), v.clone(), EdgeKey(key), attrs.clone()));
                }
            }
            nodes.push(u);
        }
        (nodes, edges)
    };

    let mut store = GraphStore::with_policy(kind, policy);
    store.add_nodes_from(nodes)?;
    store.add_edges_from(edges)?;
    debug!(
        "Built {} store from adjacency map: {} nodes, {} edges",
        kind,
        store.node_count(),
        store.edge_count()
    );
    Ok(store)
}

/// Build a store from a node-link document.
///
/// Unknown top-level fields fail with `UnknownIncompatibleFeature` unless
/// the policy can quarantine them.
pub fn from_document(
    doc: &AttrValue,
    policy: PolicyEngine,
) -> GraphResult<(GraphStore, IngestReport)> {
    let parsed = {
        let mut adm = policy.admit("from_document");
        let parsed = parse_document(doc, &mut adm)?;
        (parsed, adm.into_recoveries())
    };
    let (ParsedDocument { kind, graph, nodes, edges, quarantined }, recoveries) = parsed;

    let mut store = GraphStore::with_policy(kind, policy);
    store.graph_attrs.merge_owned(graph);
    store.add_nodes_from(nodes)?;
    store.add_edges_from(edges)?;
    debug!(
        "Ingested {} document: {} nodes, {} edges, {} quarantined fields",
        kind,
        store.node_count(),
        store.edge_count(),
        quarantined.len()
    );
    Ok((store, IngestReport { quarantined, recoveries }))
}

/// Parse JSON text and build a store from it
pub fn from_json_str(text: &str, policy: PolicyEngine) -> GraphResult<(GraphStore, IngestReport)> {
    let doc: AttrValue = serde_json::from_str(text)
        .map_err(|e| {
            policy
                .admit("from_json_str")
                .unsupported(format!("invalid JSON document: {}", e))
        })?;
    from_document(&doc, policy)
}

/// Serialize a store as a node-link document
pub fn to_document(store: &GraphStore) -> AttrValue {
    let nodes = store
        .node_table()
        .iter()
        .map(|(id, attrs)| {
            let mut entry = AttrBag::new();
            entry.insert("id", id.to_value());
            entry.merge(attrs);
            entry.insert("id", id.to_value());
            AttrValue::Map(entry)
        })
        .collect::<Vec<_>>();
    let edges = store
        .edge_iter()
        .map(|edge| {
            let mut entry = AttrBag::new();
            entry.insert("source", edge.source.to_value());
            entry.insert("target", edge.target.to_value());
            if let Some(key) = edge.key {
                entry.insert("key", key.as_u64());
            }
            entry.merge(&edge.attrs.read());
            entry.insert("source", edge.source.to_value());
            entry.insert("target", edge.target.to_value());
            if let Some(key) = edge.key {
                entry.insert("key", key.as_u64());
            }
            AttrValue::Map(entry)
        })
        .collect::<Vec<_>>();

    let mut doc = AttrBag::new();
    doc.insert("directed", store.is_directed());
    doc.insert("multigraph", store.is_multigraph());
    doc.insert("graph", store.graph_attrs().clone());
    doc.insert("nodes", nodes);
    doc.insert("edges", edges);
    AttrValue::Map(doc)
}

pub fn to_json_string(store: &GraphStore) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_document(store))
}

struct ParsedDocument {
    kind: GraphKind,
    graph: AttrBag,
    nodes: Vec<NodeInput>,
    edges: Vec<EdgeInput>,
    quarantined: Vec<(String, AttrValue)>,
}

fn parse_document(doc: &AttrValue, adm: &mut Admission<'_>) -> GraphResult<ParsedDocument> {
    let doc = match doc {
        AttrValue::Map(doc) => doc,
        other => {
            let reason = format!("document must be a mapping, got {}", other.type_name());
            return Err(adm.unsupported(reason));
        }
    };

    let mut quarantined = Vec::new();
    for (field, value) in doc.iter() {
        if !DOCUMENT_FIELDS.contains(&field.as_str()) {
            adm.unknown_field(field)?;
            quarantined.push((field.clone(), value.clone()));
        }
    }

    let kind = GraphKind::new(flag(adm, doc, "directed")?, flag(adm, doc, "multigraph")?);
    let graph = match doc.get("graph") {
        None | Some(AttrValue::Null) => AttrBag::new(),
        Some(value) => as_mapping(adm, value, || "`graph`".to_string())?.clone(),
    };

    let mut nodes = Vec::new();
    for entry in entries(adm, doc, "nodes")? {
        let mut attrs = as_mapping(adm, entry, || "node entry".to_string())?.clone();
        let id = attrs
            .remove("id")
            .ok_or_else(|| adm.unsupported("node entry without `id`"))?;
        nodes.push(NodeInput::WithAttrs(node_id(adm, &id)?, attrs));
    }

    let mut edges = Vec::new();
    for (i, entry) in entries(adm, doc, "edges")?.iter().enumerate() {
        let mut attrs = as_mapping(adm, entry, || "edge entry".to_string())?.clone();
        let (source, target) = match (attrs.remove("source"), attrs.remove("target")) {
            (Some(source), Some(target)) => (node_id(adm, &source)?, node_id(adm, &target)?),
            _ => return Err(adm.unsupported("edge entry without `source` and `target`")),
        };
        let edge = match attrs.remove("key") {
            None => EdgeInput::WithAttrs(source, target, attrs),
            Some(key) if !kind.multi => {
                let reason =
                    format!("edge {}-{} carries key {} on a non-multigraph", source, target, key);
                return Err(adm.arity(4, reason).at_item(i));
            }
            Some(AttrValue::Integer(key)) if key >= 0 => {
                EdgeInput::Full(source, target, EdgeKey(key as u64), attrs)
            }
            Some(other) => {
                let reason = format!("edge key must be a non-negative integer, got {}", other);
                return Err(adm.unsupported(reason));
            }
        };
        edges.push(edge);
    }

    Ok(ParsedDocument {
        kind,
        graph,
        nodes,
        edges,
        quarantined,
    })
}

fn as_mapping<'v>(
    adm: &Admission<'_>,
    value: &'v AttrValue,
    what: impl FnOnce() -> String,
) -> GraphResult<&'v AttrBag> {
    value
        .as_map()
        .ok_or_else(|| {
            adm.unsupported(format!("{} must be a mapping, got {}", what(), value.type_name()))
        })
}

fn flag(adm: &Admission<'_>, doc: &AttrBag, field: &str) -> GraphResult<bool> {
    match doc.get(field) {
        None => Ok(false),
        Some(AttrValue::Boolean(b)) => Ok(*b),
        Some(other) => Err(adm.unsupported(format!(
            "`{}` must be a boolean, got {}",
            field,
            other.type_name()
        ))),
    }
}

fn entries<'d>(adm: &Admission<'_>, doc: &'d AttrBag, field: &str) -> GraphResult<&'d [AttrValue]> {
    match doc.get(field) {
        None | Some(AttrValue::Null) => Ok(&[]),
        Some(AttrValue::Array(items)) => Ok(items),
        Some(other) => Err(adm.unsupported(format!(
            "`{}` must be a list, got {}",
            field,
            other.type_name()
        ))),
    }
}

fn node_id(adm: &Admission<'_>, value: &AttrValue) -> GraphResult<NodeId> {
    NodeId::from_value(value)
        .ok_or_else(|| adm.unsupported(format!("{} cannot identify a node", value.type_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ErrorKind;
    use crate::policy::Recovery;

    #[test]
    fn test_empty_graph() {
        let store = empty_graph(GraphKind::DIRECTED, 3, PolicyEngine::strict()).unwrap();
        assert_eq!(store.node_count(), 3);
        assert!(store.has_node(&NodeId::Int(2)));

        let err = empty_graph(GraphKind::DIRECTED, -1, PolicyEngine::hardened()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
    }

    #[test]
    fn test_from_adjacency_map_multigraph() {
        let json = r#"{"a": {"b": {"0": {"w": 1}, "3": {}}}, "b": {}}"#;
        let map: AttrBag = serde_json::from_str(json).unwrap();
        let store =
            from_adjacency_map(GraphKind::MULTI_DIRECTED, &map, PolicyEngine::strict()).unwrap();

        assert_eq!(store.edge_count(), 2);
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        assert_eq!(store.edge_keys(&a, &b), vec![EdgeKey(0), EdgeKey(3)]);
        assert_eq!(store.new_edge_key(&a, &b), EdgeKey(4));
    }

    #[test]
    fn test_from_adjacency_map_malformed() {
        let map: AttrBag = serde_json::from_str(r#"{"a": {"b": 5}}"#).unwrap();
        let err =
            from_adjacency_map(GraphKind::UNDIRECTED, &map, PolicyEngine::strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);

        let map: AttrBag = serde_json::from_str(r#"{"a": {"b": {"x": {}}}}"#).unwrap();
        let err = from_adjacency_map(GraphKind::MULTI_UNDIRECTED, &map, PolicyEngine::strict())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
    }

    #[test]
    fn test_unknown_field_strict_vs_hardened() {
        let text = r#"{"directed": true, "links": [], "nodes": [{"id": 1}]}"#;

        let err = from_json_str(text, PolicyEngine::strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownIncompatibleFeature);

        let (store, report) = from_json_str(text, PolicyEngine::hardened()).unwrap();
        assert!(store.is_directed());
        assert_eq!(report.quarantined.len(), 1);
        assert_eq!(report.quarantined[0].0, "links");
        assert_eq!(report.recoveries[0].recovery, Recovery::QuarantineUnknownField);
    }

    #[test]
    fn test_two_unknown_fields_exceed_budget() {
        let text = r#"{"links": [], "extra": 1}"#;
        let err = from_json_str(text, PolicyEngine::hardened()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownIncompatibleFeature);
    }

    #[test]
    fn test_document_round_trip() {
        let mut store = GraphStore::multi_undirected();
        store.set_graph_attr("name", "demo");
        store.add_node_with_attrs("a", [("color", "red")].into_iter().collect()).unwrap();
        store.add_edge_with_attrs("a", "b", [("weight", 2)].into_iter().collect()).unwrap();
        store.add_edge("a", "b").unwrap();

        let text = to_json_string(&store).unwrap();
        let (back, report) = from_json_str(&text, PolicyEngine::strict()).unwrap();
        assert!(report.is_clean());
        assert_eq!(back.kind(), store.kind());
        assert_eq!(back.graph_attrs(), store.graph_attrs());
        assert_eq!(back.edges().to_vec(), store.edges().to_vec());
        assert_eq!(back.node_attrs(&NodeId::from("a")), store.node_attrs(&NodeId::from("a")));
    }

    #[test]
    fn test_document_key_on_simple_graph() {
        let text = r#"{"edges": [{"source": "a", "target": "b", "key": 1}]}"#;
        let err = from_json_str(text, PolicyEngine::strict()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arity);
    }

    #[test]
    fn test_null_node_in_document() {
        let text = r#"{"nodes": [{"id": null}]}"#;
        let err = from_json_str(text, PolicyEngine::hardened()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullIdentifier);
    }
}
