//! Tree model: the index, the node cache, and the mutation protocol.

use std::path::{Path, PathBuf};

use tokio::sync::broadcast;

use glyphdex_core::{IconRecord, SharedRecord, SourceKind, read_record};
use glyphdex_index::IconIndex;

use crate::cache::NodeCache;
use crate::refresh::{RefreshHub, RefreshScope};
use crate::view::{NodeType, ViewNode, ViewNodeIdentity};

/// Sections in display order.
const SECTION_ORDER: [SourceKind; 4] = [
    SourceKind::Workspace,
    SourceKind::Library,
    SourceKind::Inline,
    SourceKind::Reference,
];

/// Renders the icon index as a navigable node tree and keeps it
/// consistent under single-entity edits without over-invalidating.
///
/// Mutations targeting a record that no longer exists are silent
/// no-ops: edit requests can race an in-flight full refresh and must
/// never throw.
#[derive(Debug)]
pub struct IconTreeModel {
    index: IconIndex,
    cache: NodeCache,
    hub: RefreshHub,
}

impl IconTreeModel {
    /// Create a model over an empty index.
    pub fn new() -> Self {
        Self::with_index(IconIndex::new())
    }

    /// Create a model over an already-populated index.
    pub fn with_index(index: IconIndex) -> Self {
        Self {
            index,
            cache: NodeCache::new(),
            hub: RefreshHub::new(),
        }
    }

    /// Read access to the underlying index.
    pub fn index(&self) -> &IconIndex {
        &self.index
    }

    /// Write access for the population pipeline. Bulk writers should
    /// finish with [`notify_full`](Self::notify_full).
    pub fn index_mut(&mut self) -> &mut IconIndex {
        &mut self.index
    }

    /// Subscribe to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshScope> {
        self.hub.subscribe()
    }

    /// Announce a full-tree refresh after bulk population.
    pub fn notify_full(&self) {
        self.hub.notify_full();
    }

    /// Number of cached (realized) nodes.
    pub fn cached_nodes(&self) -> usize {
        self.cache.len()
    }

    // ------------------------------------------------------------------
    // Query surface
    // ------------------------------------------------------------------

    /// Root sections: one node per source kind that currently holds
    /// records.
    pub fn root_sections(&mut self) -> Vec<ViewNode> {
        let mut sections = Vec::new();
        for kind in SECTION_ORDER {
            let count = self.index.count_of(kind);
            if count == 0 {
                continue;
            }
            let node = ViewNode::section(kind, count);
            self.cache.insert(node.clone());
            sections.push(node);
        }
        sections
    }

    /// Children of a realized node: categories under a section, icons
    /// under a category, nothing under an icon.
    pub fn children_of(&mut self, identity: &ViewNodeIdentity) -> Vec<ViewNode> {
        match identity.node_type {
            NodeType::Section => {
                let kind = identity.source_kind;
                let mut nodes = Vec::new();
                for category in self.index.categories_of(kind) {
                    let count = self.index.in_category(kind, &category).len();
                    let node = ViewNode::category(kind, &category, count);
                    self.cache.insert(node.clone());
                    nodes.push(node);
                }
                nodes
            }
            NodeType::Category => {
                let kind = identity.source_kind;
                let mut nodes: Vec<ViewNode> = self
                    .index
                    .in_category(kind, &identity.name)
                    .iter()
                    .map(|handle| ViewNode::icon(&read_record(handle)))
                    .collect();
                // Alphabetical ordering is imposed here, not by the scan.
                nodes.sort_by(|a, b| a.label.cmp(&b.label));
                for node in &nodes {
                    self.cache.insert(node.clone());
                }
                nodes
            }
            NodeType::Icon => Vec::new(),
        }
    }

    /// Realize the node for a name or path, for reveal-style
    /// navigation.
    pub fn find_node(&mut self, key: &str) -> Option<ViewNode> {
        let handle = self.index.find_by_name_or_path(key)?;
        let node = ViewNode::icon(&read_record(&handle));
        self.cache.insert(node.clone());
        Some(node)
    }

    /// Synchronous name lookup.
    pub fn get_icon(&self, name: &str) -> Option<SharedRecord> {
        self.index.lookup_by_name(name)
    }

    /// Synchronous path lookup.
    pub fn get_icon_by_path(&self, path: impl AsRef<Path>) -> Option<SharedRecord> {
        self.index.lookup_by_path(path)
    }

    // ------------------------------------------------------------------
    // Mutation protocol
    // ------------------------------------------------------------------

    /// Insert a new record. If its container node is already realized
    /// the refresh is scoped to that container; otherwise the whole
    /// tree refreshes.
    pub fn add_icon(&mut self, record: IconRecord) -> SharedRecord {
        let kind = record.kind;
        let category = record.category.clone();
        let handle = self.index.insert(record);

        let container = ViewNodeIdentity::category(kind, category.clone());
        if self.cache.contains(&container) {
            let count = self.index.in_category(kind, &category).len();
            self.cache.insert(ViewNode::category(kind, &category, count));
            self.hub.notify_node(container);
        } else {
            self.hub.notify_full();
        }
        handle
    }

    /// Rename a record in place. Live handles observe the new fields;
    /// cache entries embedding the old name or sharing its container
    /// are purged. Because every child key under the record changes,
    /// this emits a full-tree refresh rather than a scoped one.
    pub fn rename_icon(&mut self, old_name: &str, new_name: &str, new_path: Option<PathBuf>) {
        let Some(handle) = self.index.lookup_by_name(old_name) else {
            // Raced with a refresh that already dropped the record.
            tracing::debug!(old_name, "rename target missing; ignored");
            return;
        };
        let old_category = read_record(&handle).category.clone();

        if !self.index.rename(old_name, new_name, new_path) {
            return;
        }
        let new_category = read_record(&handle).category.clone();

        self.cache.purge_name(old_name);
        self.cache.purge_container(&old_category);
        if new_category != old_category {
            self.cache.purge_container(&new_category);
        }
        self.hub.notify_full();
    }

    /// Remove a record. The cached container's displayed count is
    /// updated, or the container node dropped once it empties.
    pub fn remove_icon(&mut self, name: &str) {
        let Some(removed) = self.index.remove(name) else {
            tracing::debug!(name, "remove target missing; ignored");
            return;
        };
        let (kind, category) = {
            let record = read_record(&removed);
            (record.kind, record.category.clone())
        };

        self.cache.purge_name(name);
        let container = ViewNodeIdentity::category(kind, category.clone());
        let remaining = self.index.in_category(kind, &category).len();
        if self.cache.contains(&container) && remaining > 0 {
            self.cache
                .insert(ViewNode::category(kind, &category, remaining));
            self.hub.notify_node(container);
        } else {
            self.cache.remove(&container);
            self.hub.notify_full();
        }
    }

    /// Clear every store and the whole node cache. Re-population is
    /// deferred to the next data request; a refresh never eagerly
    /// re-scans.
    pub fn refresh_all(&mut self) {
        self.index.clear();
        self.cache.clear();
        self.hub.notify_full();
    }
}

impl Default for IconTreeModel {
    fn default() -> Self {
        Self::new()
    }
}
