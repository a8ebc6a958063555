//! Change notification for the presentation layer.

use tokio::sync::broadcast;

use crate::view::ViewNodeIdentity;

/// What a change notification covers: the whole tree, or a single
/// cached node and its children.
#[derive(Debug, Clone)]
pub enum RefreshScope {
    /// Re-render everything.
    Full,
    /// Re-render one container node.
    Node(ViewNodeIdentity),
}

impl RefreshScope {
    /// Whether this is a full-tree refresh.
    pub fn is_full(&self) -> bool {
        matches!(self, RefreshScope::Full)
    }
}

/// Broadcast hub for refresh notifications. Firing with no target means
/// a full refresh; firing with a cached node scopes the refresh to it.
#[derive(Debug)]
pub struct RefreshHub {
    tx: broadcast::Sender<RefreshScope>,
}

impl RefreshHub {
    /// Create a new hub.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Subscribe to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshScope> {
        self.tx.subscribe()
    }

    /// Request a full-tree refresh.
    pub fn notify_full(&self) {
        let _ = self.tx.send(RefreshScope::Full);
    }

    /// Request a refresh scoped to one node.
    pub fn notify_node(&self, identity: ViewNodeIdentity) {
        let _ = self.tx.send(RefreshScope::Node(identity));
    }
}

impl Default for RefreshHub {
    fn default() -> Self {
        Self::new()
    }
}
