//! Incremental tree cache and partial-refresh protocol for glyphdex.
//!
//! Lets a presentation layer render the icon index as a navigable node
//! tree, reveal specific nodes, and apply single-entity mutations
//! without losing unrelated expansion state or re-walking the tree.
//!
//! Every realized node is cached under a stable composite identity, so
//! two renders of the same record at different times refresh the cache
//! entry in place even when transient fields (usage counts, animation
//! assignment) differ.

mod cache;
mod model;
mod refresh;
mod view;

pub use cache::NodeCache;
pub use model::IconTreeModel;
pub use refresh::{RefreshHub, RefreshScope};
pub use view::{NodeType, ViewNode, ViewNodeIdentity};

// Re-export core types for convenience
pub use glyphdex_core::{IconRecord, SharedRecord, SourceKind};
pub use glyphdex_index::IconIndex;
