//! Session object: scan, extract, populate, notify.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use glyphdex_core::{
    IconRecord, ScanConfig, ScanError, ScanIssue, SharedRecord, write_record,
};
use glyphdex_index::extract;
use glyphdex_scan::{AssetWalker, with_timeout};
use glyphdex_tree::{IconTreeModel, RefreshScope, ViewNode};

use crate::context::SessionContext;

/// Outcome of one rebuild, for user-facing messaging.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// Matching workspace files recorded.
    pub files_scanned: u64,
    /// Records extracted from library artifacts.
    pub library_icons: usize,
    /// Whether a configured ceiling cut the walk short.
    pub truncated: bool,
    /// Per-entry issues from the walk and artifact reads.
    pub issues: Vec<ScanIssue>,
    /// Wall-clock duration of the whole rebuild.
    pub duration: Duration,
}

/// One live indexing session.
///
/// Owns the tree model and the per-session service context, and runs
/// the population pipeline: walk workspace assets, extract library
/// artifacts, fill the index, announce a full refresh.
pub struct IconSession {
    config: ScanConfig,
    walker: AssetWalker,
    context: SessionContext,
    library_artifacts: Vec<PathBuf>,
    model: Mutex<IconTreeModel>,
    scanning: AtomicBool,
}

impl IconSession {
    /// Create a session.
    pub fn new(config: ScanConfig, context: SessionContext) -> Result<Self, ScanError> {
        let walker = AssetWalker::new(config.clone())?;
        Ok(Self {
            config,
            walker,
            context,
            library_artifacts: Vec::new(),
            model: Mutex::new(IconTreeModel::new()),
            scanning: AtomicBool::new(false),
        })
    }

    /// Configure the generated artifacts read on every rebuild.
    pub fn with_library_artifacts(mut self, artifacts: Vec<PathBuf>) -> Self {
        self.library_artifacts = artifacts;
        self
    }

    /// The session's service context.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Whether a rebuild is currently in flight.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Run a closure against the tree model.
    pub fn with_model<R>(&self, f: impl FnOnce(&mut IconTreeModel) -> R) -> R {
        let mut model = self
            .model
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut model)
    }

    /// Subscribe to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshScope> {
        self.with_model(|model| model.subscribe())
    }

    /// Re-run the whole pipeline against `root`.
    ///
    /// A rebuild arriving while one is already in flight is coalesced
    /// into a no-op rather than cancelled-and-restarted or queued; the
    /// caller gets `None` and the in-flight result stands.
    pub async fn rebuild(&self, root: impl AsRef<Path>) -> Option<ScanSummary> {
        if self.scanning.swap(true, Ordering::SeqCst) {
            tracing::debug!("rebuild already in flight; request coalesced");
            return None;
        }
        let summary = self.rebuild_inner(root.as_ref()).await;
        self.scanning.store(false, Ordering::SeqCst);
        Some(summary)
    }

    async fn rebuild_inner(&self, root: &Path) -> ScanSummary {
        let started = Instant::now();

        let result = self.walker.scan(root).await;
        let mut issues = result.issues;

        self.with_model(|model| {
            let index = model.index_mut();
            index.clear();
            for record in result.records {
                index.insert(self.decorated(record));
            }
        });

        let mut library_icons = 0;
        for artifact in &self.library_artifacts {
            let text = with_timeout(
                tokio::fs::read_to_string(artifact.clone()),
                self.config.file_timeout(),
                Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "artifact read timed out",
                )),
            )
            .await;
            match text {
                Ok(text) => {
                    let records = extract(artifact, &text);
                    library_icons += records.len();
                    self.with_model(|model| {
                        let index = model.index_mut();
                        for record in records {
                            index.insert(self.decorated(record));
                        }
                    });
                }
                Err(error) if error.kind() == std::io::ErrorKind::TimedOut => {
                    issues.push(ScanIssue::timeout(artifact, self.config.file_timeout_ms));
                }
                Err(error) => {
                    issues.push(ScanIssue::read_file(artifact, &error));
                }
            }
        }

        self.with_model(|model| model.notify_full());

        tracing::debug!(
            files = result.files_scanned,
            library = library_icons,
            truncated = result.truncated,
            "rebuild finished"
        );

        ScanSummary {
            files_scanned: result.files_scanned,
            library_icons,
            truncated: result.truncated,
            issues,
            duration: started.elapsed(),
        }
    }

    /// Apply session-context decorations to a freshly discovered
    /// record: an assigned animation preset wins over none.
    fn decorated(&self, mut record: IconRecord) -> IconRecord {
        if record.animation.is_none() {
            if let Some(preset) = self.context.animations.preset_for(&record.name) {
                record.animation = Some(preset.clone());
            }
        }
        record
    }

    // ------------------------------------------------------------------
    // Single-entity pass-throughs
    // ------------------------------------------------------------------

    /// Add one record without re-scanning.
    pub fn add_icon(&self, record: IconRecord) -> SharedRecord {
        let record = self.decorated(record);
        self.with_model(|model| model.add_icon(record))
    }

    /// Rename one record in place.
    pub fn rename_icon(&self, old_name: &str, new_name: &str, new_path: Option<PathBuf>) {
        self.with_model(|model| model.rename_icon(old_name, new_name, new_path));
    }

    /// Remove one record.
    pub fn remove_icon(&self, name: &str) {
        self.with_model(|model| model.remove_icon(name));
    }

    /// Clear everything; repopulation waits for the next rebuild or
    /// data request.
    pub fn refresh_all(&self) {
        self.with_model(|model| model.refresh_all());
    }

    /// Realize the node for a name or path, for reveal-in-tree
    /// navigation.
    pub fn reveal(&self, key: &str) -> Option<ViewNode> {
        self.with_model(|model| model.find_node(key))
    }

    /// Name lookup against the live index.
    pub fn get_icon(&self, name: &str) -> Option<SharedRecord> {
        self.with_model(|model| model.get_icon(name))
    }

    /// Path lookup against the live index.
    pub fn get_icon_by_path(&self, path: impl AsRef<Path>) -> Option<SharedRecord> {
        self.with_model(|model| model.get_icon_by_path(path))
    }

    /// Record usage sites reported by the companion usage scanner.
    /// Transient with respect to node identity.
    pub fn set_usages(&self, name: &str, usages: Vec<glyphdex_core::UsageSite>) {
        if let Some(handle) = self.get_icon(name) {
            write_record(&handle).set_usages(usages);
        }
    }
}
