//! Orchestration layer for glyphdex.
//!
//! Wires the walker, extractor, index, and tree model into one session
//! object, and carries the per-session service context (animation and
//! color-variant registries) that population consults. The context is
//! constructed once and passed in explicitly rather than reached
//! through ambient global accessors.

mod context;
mod session;

pub use context::{AnimationRegistry, ColorVariantRegistry, SessionContext};
pub use session::{IconSession, ScanSummary};

// Re-export the surface callers need alongside a session
pub use glyphdex_core::{IconRecord, ScanConfig, ScanError, SharedRecord, SourceKind};
pub use glyphdex_tree::{IconTreeModel, RefreshScope, ViewNode};
