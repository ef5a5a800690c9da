//! Node view

use crate::graph::{AttrBag, AttrValue, GraphStore, NodeId};

/// Live view of a store's nodes in insertion order.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'g> {
    store: &'g GraphStore,
}

impl<'g> NodeView<'g> {
    pub(crate) fn new(store: &'g GraphStore) -> Self {
        NodeView { store }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'g NodeId> + 'g {
        self.store.node_table().keys()
    }

    /// Nodes paired with their attributes
    pub fn data(&self) -> impl Iterator<Item = (&'g NodeId, &'g AttrBag)> + 'g {
        self.store.node_table().iter()
    }

    pub fn len(&self) -> usize {
        self.store.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.store.has_node(node)
    }

    pub fn attrs(&self, node: &NodeId) -> Option<&'g AttrBag> {
        self.store.node_table().get(node)
    }

    pub fn get(&self, node: &NodeId, name: &str) -> Option<&'g AttrValue> {
        self.attrs(node)?.get(name)
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.iter().cloned().collect()
    }
}

impl<'g> IntoIterator for NodeView<'g> {
    type Item = &'g NodeId;
    type IntoIter = indexmap::map::Keys<'g, NodeId, AttrBag>;

    fn into_iter(self) -> Self::IntoIter {
        self.store.node_table().keys()
    }
}
