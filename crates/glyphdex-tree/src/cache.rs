//! Cache of realized presentation nodes.

use std::collections::HashMap;

use crate::view::{ViewNode, ViewNodeIdentity};

/// Realized nodes keyed by their stable identity.
///
/// Because identities survive transient-field updates, a re-render of
/// the same record refreshes its entry in place rather than replacing
/// it, which is what keeps unrelated expansion state alive in the
/// presentation layer.
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: HashMap<ViewNodeIdentity, ViewNode>,
}

impl NodeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a node under its identity.
    pub fn insert(&mut self, node: ViewNode) {
        self.nodes.insert(node.identity.clone(), node);
    }

    /// Fetch a cached node.
    pub fn get(&self, identity: &ViewNodeIdentity) -> Option<&ViewNode> {
        self.nodes.get(identity)
    }

    /// Whether an identity has been realized.
    pub fn contains(&self, identity: &ViewNodeIdentity) -> bool {
        self.nodes.contains_key(identity)
    }

    /// Drop one node.
    pub fn remove(&mut self, identity: &ViewNodeIdentity) -> Option<ViewNode> {
        self.nodes.remove(identity)
    }

    /// Drop every node whose identity names the given icon.
    pub fn purge_name(&mut self, name: &str) {
        self.nodes.retain(|identity, _| identity.name != name);
    }

    /// Drop every node that lives inside the given container, along
    /// with the container node itself.
    pub fn purge_container(&mut self, container_key: &str) {
        self.nodes.retain(|identity, _| {
            identity.container_key != container_key && identity.name != container_key
        });
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of realized nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is realized.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
