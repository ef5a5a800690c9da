//! Core type definitions for the graph store

use serde::{Deserialize, Serialize};
use std::fmt;

use super::property::AttrValue;

/// Identifier of a node.
///
/// Identifiers are dynamically typed so that payloads coming from foreign
/// sources (JSON documents, nested adjacency mappings) can be ingested
/// without a lossy conversion. `Null` stands for an absent identifier; it
/// can be constructed and deserialized but every mutation path rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Null,
    Int(i64),
    Str(String),
    Tuple(Vec<NodeId>),
}

impl NodeId {
    pub fn is_null(&self) -> bool {
        matches!(self, NodeId::Null)
    }

    /// Convert a dynamic attribute value into an identifier.
    ///
    /// Returns `None` for values that cannot identify a node (floats,
    /// booleans, maps).
    pub fn from_value(value: &AttrValue) -> Option<NodeId> {
        match value {
            AttrValue::Null => Some(NodeId::Null),
            AttrValue::Integer(i) => Some(NodeId::Int(*i)),
            AttrValue::String(s) => Some(NodeId::Str(s.clone())),
            AttrValue::Array(items) => items
                .iter()
                .map(NodeId::from_value)
                .collect::<Option<Vec<_>>>()
                .map(NodeId::Tuple),
            _ => None,
        }
    }

    /// Inverse of [`NodeId::from_value`], used by document export.
    pub fn to_value(&self) -> AttrValue {
        match self {
            NodeId::Null => AttrValue::Null,
            NodeId::Int(i) => AttrValue::Integer(*i),
            NodeId::Str(s) => AttrValue::String(s.clone()),
            NodeId::Tuple(items) => AttrValue::Array(items.iter().map(NodeId::to_value).collect()),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Null => write!(f, "null"),
            NodeId::Int(i) => write!(f, "{}", i),
            NodeId::Str(s) => write!(f, "{:?}", s),
            NodeId::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::Str(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId::Str(s)
    }
}

impl From<&String> for NodeId {
    fn from(s: &String) -> Self {
        NodeId::Str(s.clone())
    }
}

impl From<i64> for NodeId {
    fn from(i: i64) -> Self {
        NodeId::Int(i)
    }
}

impl From<i32> for NodeId {
    fn from(i: i32) -> Self {
        NodeId::Int(i as i64)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl<A: Into<NodeId>, B: Into<NodeId>> From<(A, B)> for NodeId {
    fn from((a, b): (A, B)) -> Self {
        NodeId::Tuple(vec![a.into(), b.into()])
    }
}

/// Key distinguishing parallel edges between one endpoint pair.
///
/// Simple graphs carry the implicit key `0` on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct EdgeKey(pub u64);

impl EdgeKey {
    /// The key every simple-graph edge carries.
    pub const IMPLICIT: EdgeKey = EdgeKey(0);

    pub fn new(key: u64) -> Self {
        EdgeKey(key)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EdgeKey {
    fn from(key: u64) -> Self {
        EdgeKey(key)
    }
}

/// Capability flags of a store: the four graph variants share one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphKind {
    pub directed: bool,
    pub multi: bool,
}

impl GraphKind {
    pub const UNDIRECTED: GraphKind = GraphKind { directed: false, multi: false };
    pub const DIRECTED: GraphKind = GraphKind { directed: true, multi: false };
    pub const MULTI_UNDIRECTED: GraphKind = GraphKind { directed: false, multi: true };
    pub const MULTI_DIRECTED: GraphKind = GraphKind { directed: true, multi: true };

    pub fn new(directed: bool, multi: bool) -> Self {
        GraphKind { directed, multi }
    }

    pub fn with_directed(self, directed: bool) -> Self {
        GraphKind { directed, ..self }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.directed, self.multi) {
            (false, false) => "undirected simple graph",
            (true, false) => "directed simple graph",
            (false, true) => "undirected multigraph",
            (true, true) => "directed multigraph",
        };
        write!(f, "{}", name)
    }
}

/// Which adjacency table a neighbor query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Successors (`succ`); the only table of an undirected store.
    Out,
    /// Predecessors (`pred`); aliases `Out` on undirected stores.
    In,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}
