//! Bulk input shapes accepted by the mutation surface
//!
//! Typed callers build [`NodeInput`] / [`EdgeInput`] directly. Dynamic
//! callers (deserialized payloads) hand over tuples as [`AttrValue`] arrays
//! and go through [`EdgeInput::from_tuple`], which applies the arity rules
//! under the request's policy admission.

use super::error::GraphResult;
use super::property::{AttrBag, AttrValue};
use super::store::GraphStore;
use super::types::{EdgeKey, NodeId};
use crate::policy::{Admission, Recovery};

/// One item of `add_nodes_from`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeInput {
    Id(NodeId),
    WithAttrs(NodeId, AttrBag),
}

impl NodeInput {
    pub fn id(&self) -> &NodeId {
        match self {
            NodeInput::Id(id) | NodeInput::WithAttrs(id, _) => id,
        }
    }

    pub(crate) fn into_parts(self) -> (NodeId, Option<AttrBag>) {
        match self {
            NodeInput::Id(id) => (id, None),
            NodeInput::WithAttrs(id, attrs) => (id, Some(attrs)),
        }
    }
}

macro_rules! node_input_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for NodeInput {
                fn from(id: $t) -> Self {
                    NodeInput::Id(id.into())
                }
            }

            impl From<($t, AttrBag)> for NodeInput {
                fn from((id, attrs): ($t, AttrBag)) -> Self {
                    NodeInput::WithAttrs(id.into(), attrs)
                }
            }
        )*
    };
}

node_input_from!(NodeId, &NodeId, &str, String, i64, i32);

/// One item of `add_edges_from` / `remove_edges_from`.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeInput {
    /// `(u, v)`
    Pair(NodeId, NodeId),
    /// `(u, v, attrs)`
    WithAttrs(NodeId, NodeId, AttrBag),
    /// `(u, v, key)`: multigraphs only.
    Keyed(NodeId, NodeId, EdgeKey),
    /// `(u, v, key, attrs)`: multigraphs only.
    Full(NodeId, NodeId, EdgeKey, AttrBag),
}

impl EdgeInput {
    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        match self {
            EdgeInput::Pair(u, v)
            | EdgeInput::WithAttrs(u, v, _)
            | EdgeInput::Keyed(u, v, _)
            | EdgeInput::Full(u, v, _, _) => (u, v),
        }
    }

    pub fn key(&self) -> Option<EdgeKey> {
        match self {
            EdgeInput::Keyed(_, _, key) | EdgeInput::Full(_, _, key, _) => Some(*key),
            _ => None,
        }
    }

    /// Tuple length this input corresponds to.
    pub fn arity(&self) -> usize {
        match self {
            EdgeInput::Pair(..) => 2,
            EdgeInput::WithAttrs(..) | EdgeInput::Keyed(..) => 3,
            EdgeInput::Full(..) => 4,
        }
    }

    /// The same input with its endpoints exchanged.
    pub fn swapped(self) -> EdgeInput {
        match self {
            EdgeInput::Pair(u, v) => EdgeInput::Pair(v, u),
            EdgeInput::WithAttrs(u, v, attrs) => EdgeInput::WithAttrs(v, u, attrs),
            EdgeInput::Keyed(u, v, key) => EdgeInput::Keyed(v, u, key),
            EdgeInput::Full(u, v, key, attrs) => EdgeInput::Full(v, u, key, attrs),
        }
    }

    pub(crate) fn into_parts(self) -> (NodeId, NodeId, Option<EdgeKey>, Option<AttrBag>) {
        match self {
            EdgeInput::Pair(u, v) => (u, v, None, None),
            EdgeInput::WithAttrs(u, v, attrs) => (u, v, None, Some(attrs)),
            EdgeInput::Keyed(u, v, key) => (u, v, Some(key), None),
            EdgeInput::Full(u, v, key, attrs) => (u, v, Some(key), Some(attrs)),
        }
    }

    /// Disambiguate a dynamic edge tuple.
    ///
    /// - 2 items: `(u, v)`
    /// - 3 items: `(u, v, attrs)` when the third item is a map, otherwise
    ///   `(u, v, key)`, which requires a multigraph
    /// - 4 items: `(u, v, key, attrs)`, multigraphs only. A tuple given as
    ///   `(u, v, attrs, key)` is rewritten only if the admission can spend
    ///   a `CanonicalizeTupleOrder` recovery.
    pub fn from_tuple(
        tuple: &AttrValue,
        multi: bool,
        adm: &mut Admission<'_>,
    ) -> GraphResult<EdgeInput> {
        let items = match tuple {
            AttrValue::Array(items) => items.as_slice(),
            other => {
                return Err(adm.arity(1, format!("expected a tuple, got {}", other.type_name())));
            }
        };
        match items {
            [u, v] => Ok(EdgeInput::Pair(node_of(u, adm)?, node_of(v, adm)?)),
            [u, v, AttrValue::Map(attrs)] => {
                Ok(EdgeInput::WithAttrs(node_of(u, adm)?, node_of(v, adm)?, attrs.clone()))
            }
            [u, v, key] => {
                if !multi {
                    let reason =
                        format!("edge {}-{} carries key {} on a non-multigraph", u, v, key);
                    return Err(adm.arity(3, reason));
                }
                Ok(EdgeInput::Keyed(node_of(u, adm)?, node_of(v, adm)?, key_of(key, adm)?))
            }
            [u, v, key, attrs] => {
                if !multi {
                    let reason = format!("edge {}-{} carries a key on a non-multigraph", u, v);
                    return Err(adm.arity(4, reason));
                }
                let (key, attrs) = match (key, attrs) {
                    (key, AttrValue::Map(attrs)) if !matches!(key, AttrValue::Map(_)) => {
                        (key, attrs)
                    }
                    (AttrValue::Map(attrs), key) if key_of(key, adm).is_ok() => {
                        if !adm.recover(
                            Recovery::CanonicalizeTupleOrder,
                            format!("edge {}-{} given as (u, v, attrs, key)", u, v),
                        ) {
                            let reason =
                                format!("edge {}-{} has attributes and key out of order", u, v);
                            return Err(adm.arity(4, reason));
                        }
                        (key, attrs)
                    }
                    _ => {
                        let reason = format!("edge {}-{}: expected (u, v, key, attrs)", u, v);
                        return Err(adm.arity(4, reason));
                    }
                };
                Ok(EdgeInput::Full(
                    node_of(u, adm)?,
                    node_of(v, adm)?,
                    key_of(key, adm)?,
                    attrs.clone(),
                ))
            }
            other => Err(adm.arity(other.len(), "edge tuples have 2, 3 or 4 items")),
        }
    }
}

fn node_of(value: &AttrValue, adm: &Admission<'_>) -> GraphResult<NodeId> {
    NodeId::from_value(value)
        .ok_or_else(|| adm.unsupported(format!("{} cannot identify a node", value.type_name())))
}

fn key_of(value: &AttrValue, adm: &Admission<'_>) -> GraphResult<EdgeKey> {
    match value {
        AttrValue::Integer(i) if *i >= 0 => Ok(EdgeKey(*i as u64)),
        other => Err(adm.unsupported(format!(
            "edge key must be a non-negative integer, got {}",
            other
        ))),
    }
}

impl<A: Into<NodeId>, B: Into<NodeId>> From<(A, B)> for EdgeInput {
    fn from((u, v): (A, B)) -> Self {
        EdgeInput::Pair(u.into(), v.into())
    }
}

impl<A: Into<NodeId>, B: Into<NodeId>> From<(A, B, AttrBag)> for EdgeInput {
    fn from((u, v, attrs): (A, B, AttrBag)) -> Self {
        EdgeInput::WithAttrs(u.into(), v.into(), attrs)
    }
}

impl<A: Into<NodeId>, B: Into<NodeId>> From<(A, B, EdgeKey)> for EdgeInput {
    fn from((u, v, key): (A, B, EdgeKey)) -> Self {
        EdgeInput::Keyed(u.into(), v.into(), key)
    }
}

impl<A: Into<NodeId>, B: Into<NodeId>> From<(A, B, EdgeKey, AttrBag)> for EdgeInput {
    fn from((u, v, key, attrs): (A, B, EdgeKey, AttrBag)) -> Self {
        EdgeInput::Full(u.into(), v.into(), key, attrs)
    }
}

/// Source for [`GraphStore::update`].
#[derive(Debug)]
pub enum UpdateSource<'a> {
    /// Another store: its nodes, edges and graph attributes are merged in.
    Graph(&'a GraphStore),
    /// Raw iterables; at least one must be present.
    Parts {
        nodes: Option<Vec<NodeInput>>,
        edges: Option<Vec<EdgeInput>>,
    },
}

impl<'a> UpdateSource<'a> {
    pub fn nodes(nodes: impl IntoIterator<Item = impl Into<NodeInput>>) -> Self {
        UpdateSource::Parts {
            nodes: Some(nodes.into_iter().map(Into::into).collect()),
            edges: None,
        }
    }

    pub fn edges(edges: impl IntoIterator<Item = impl Into<EdgeInput>>) -> Self {
        UpdateSource::Parts {
            nodes: None,
            edges: Some(edges.into_iter().map(Into::into).collect()),
        }
    }

    pub fn empty() -> Self {
        UpdateSource::Parts { nodes: None, edges: None }
    }
}
