//! Bounded-concurrency directory walker for asset files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dashmap::DashMap;
use futures::future::BoxFuture;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::broadcast;

use glyphdex_core::{IconRecord, ScanConfig, ScanError, ScanIssue, ScanResult};

use crate::executor::{BoxError, TaskExecutor, with_timeout};
use crate::progress::WalkProgress;

/// Discovers files with the target extension under one or more roots,
/// honoring ignore rules, a depth ceiling, and a global match ceiling.
///
/// Directory reads anywhere in the recursive descent share one
/// concurrency ceiling through the [`TaskExecutor`] gate, not a ceiling
/// per level.
pub struct AssetWalker {
    config: ScanConfig,
    executor: TaskExecutor,
    progress_tx: broadcast::Sender<WalkProgress>,
}

impl AssetWalker {
    /// Create a new walker.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let executor = TaskExecutor::new(config.max_concurrency)?;
        let (progress_tx, _) = broadcast::channel(100);
        Ok(Self {
            config,
            executor,
            progress_tx,
        })
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<WalkProgress> {
        self.progress_tx.subscribe()
    }

    /// The executor shared by this walker's descents.
    pub fn executor(&self) -> &TaskExecutor {
        &self.executor
    }

    /// Walk a single root. A missing root yields an empty result, not
    /// an error; so does a root whose own name is ignore-matched.
    pub async fn scan(&self, root: impl AsRef<Path>) -> ScanResult {
        self.scan_many(&[root.as_ref().to_path_buf()]).await
    }

    /// Walk several roots into one result.
    pub async fn scan_many(&self, roots: &[PathBuf]) -> ScanResult {
        let state = Arc::new(WalkState::new(
            self.config.clone(),
            self.executor.clone(),
            self.progress_tx.clone(),
        ));
        let jobs = self.existing_dirs(roots, &state).await;
        self.fan_out(jobs, Arc::clone(&state)).await;
        state.finish()
    }

    /// Secondary mode: walk only the named subfolders of `root`,
    /// skipping full-tree discovery. Missing folders are skipped
    /// silently.
    pub async fn scan_folders(&self, root: impl AsRef<Path>, names: &[String]) -> ScanResult {
        let root = root.as_ref();
        let targets: Vec<PathBuf> = names.iter().map(|name| root.join(name)).collect();
        self.scan_many(&targets).await
    }

    /// Filter the requested roots down to directories that exist and
    /// are not themselves ignored.
    async fn existing_dirs(&self, roots: &[PathBuf], state: &Arc<WalkState>) -> Vec<PathBuf> {
        let mut jobs = Vec::with_capacity(roots.len());
        for root in roots {
            let name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            // An ignore-matched root yields an empty result. Hidden
            // roots are allowed: asking for one is explicit.
            if self.config.should_ignore(&name) {
                continue;
            }
            let metadata = state
                .executor
                .throttle(tokio::fs::metadata(root.clone()))
                .await;
            match metadata {
                Ok(meta) if meta.is_dir() => jobs.push(root.clone()),
                // Missing or non-directory root: valid empty outcome.
                _ => {}
            }
        }
        jobs
    }

    async fn fan_out(&self, jobs: Vec<PathBuf>, state: Arc<WalkState>) {
        if jobs.is_empty() {
            return;
        }
        self.executor
            .run(
                jobs,
                move |dir| {
                    let state = Arc::clone(&state);
                    Box::pin(async move {
                        walk_dir(state, dir, 0, None).await;
                        Ok(())
                    }) as BoxFuture<'static, Result<(), BoxError>>
                },
                None,
            )
            .await;
    }
}

/// Shared mutable state for one walk run.
struct WalkState {
    config: ScanConfig,
    executor: TaskExecutor,
    records: DashMap<PathBuf, IconRecord>,
    matched: AtomicUsize,
    dirs_visited: AtomicU64,
    truncated: AtomicBool,
    issues: Mutex<Vec<ScanIssue>>,
    progress_tx: broadcast::Sender<WalkProgress>,
    started: Instant,
}

impl WalkState {
    fn new(
        config: ScanConfig,
        executor: TaskExecutor,
        progress_tx: broadcast::Sender<WalkProgress>,
    ) -> Self {
        Self {
            config,
            executor,
            records: DashMap::new(),
            matched: AtomicUsize::new(0),
            dirs_visited: AtomicU64::new(0),
            truncated: AtomicBool::new(false),
            issues: Mutex::new(Vec::new()),
            progress_tx,
            started: Instant::now(),
        }
    }

    /// Once set, stays set for the whole run.
    fn mark_truncated(&self) {
        self.truncated.store(true, Ordering::SeqCst);
    }

    fn ceiling_reached(&self) -> bool {
        self.matched.load(Ordering::SeqCst) >= self.config.max_files
    }

    /// Reserve one match slot under the global ceiling. Returns false
    /// and marks truncation when the ceiling is already exhausted.
    fn try_claim_match(&self) -> bool {
        let mut current = self.matched.load(Ordering::SeqCst);
        loop {
            if current >= self.config.max_files {
                self.mark_truncated();
                return false;
            }
            match self.matched.compare_exchange(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(now) => current = now,
            }
        }
    }

    fn push_issue(&self, issue: ScanIssue) {
        if let Ok(mut issues) = self.issues.lock() {
            issues.push(issue);
        }
    }

    fn send_progress(&self, current: &Path) {
        let errors_count = self.issues.lock().map(|i| i.len() as u64).unwrap_or(0);
        let _ = self.progress_tx.send(WalkProgress {
            files_matched: self.matched.load(Ordering::SeqCst) as u64,
            dirs_visited: self.dirs_visited.load(Ordering::SeqCst),
            current_path: current.to_path_buf(),
            errors_count,
            elapsed: self.started.elapsed(),
        });
    }

    fn finish(&self) -> ScanResult {
        let records: Vec<IconRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let issues = self.issues.lock().map(|i| i.clone()).unwrap_or_default();
        ScanResult {
            files_scanned: records.len() as u64,
            dirs_visited: self.dirs_visited.load(Ordering::SeqCst),
            truncated: self.truncated.load(Ordering::SeqCst),
            records,
            issues,
            duration: self.started.elapsed(),
        }
    }
}

/// One frame of the inherited `.iconignore` pattern chain. Each
/// directory can contribute patterns that apply to its whole subtree.
struct IgnoreFrame {
    globs: GlobSet,
    parent: Option<Arc<IgnoreFrame>>,
}

impl IgnoreFrame {
    fn matches(&self, name: &str) -> bool {
        if self.globs.is_match(name) {
            return true;
        }
        self.parent.as_ref().is_some_and(|parent| parent.matches(name))
    }

    /// Parse an ignore file's text into a new frame chained onto the
    /// inherited one. Unparseable lines are dropped, not fatal.
    fn load(text: &str, parent: Option<Arc<IgnoreFrame>>) -> Option<Arc<IgnoreFrame>> {
        let mut builder = GlobSetBuilder::new();
        let mut any = false;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Ok(glob) = Glob::new(line) {
                builder.add(glob);
                any = true;
            }
        }
        if !any {
            return parent;
        }
        match builder.build() {
            Ok(globs) => Some(Arc::new(IgnoreFrame { globs, parent })),
            Err(_) => parent,
        }
    }
}

struct Listing {
    name: String,
    is_dir: bool,
}

async fn list_entries(dir: &Path) -> Result<Vec<Listing>, std::io::Error> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await?;
        entries.push(Listing {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        });
    }
    Ok(entries)
}

fn timeout_error() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::TimedOut, "directory listing timed out")
}

/// Walk one directory. `depth` counts directory levels below the walk
/// root; a file inherits the depth of its containing directory, so a
/// file at exactly `max_depth` is included while descending past the
/// ceiling marks truncation instead.
fn walk_dir(
    state: Arc<WalkState>,
    dir: PathBuf,
    depth: u32,
    ignores: Option<Arc<IgnoreFrame>>,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        // Once the match ceiling is hit, deeper subtrees are abandoned.
        if state.ceiling_reached() {
            return;
        }

        state.dirs_visited.fetch_add(1, Ordering::SeqCst);

        let listing = state
            .executor
            .throttle(with_timeout(
                list_entries(&dir),
                state.config.file_timeout(),
                Err(timeout_error()),
            ))
            .await;

        let entries = match listing {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::TimedOut => {
                state.push_issue(ScanIssue::timeout(&dir, state.config.file_timeout_ms));
                return;
            }
            Err(error) => {
                state.push_issue(ScanIssue::read_dir(&dir, &error));
                return;
            }
        };

        // Pick up this directory's ignore file before filtering.
        let ignores = if entries
            .iter()
            .any(|entry| entry.name == state.config.ignore_file_name)
        {
            let path = dir.join(&state.config.ignore_file_name);
            match state
                .executor
                .throttle(tokio::fs::read_to_string(path.clone()))
                .await
            {
                Ok(text) => IgnoreFrame::load(&text, ignores),
                Err(error) => {
                    state.push_issue(ScanIssue::read_file(&path, &error));
                    ignores
                }
            }
        } else {
            ignores
        };

        let category = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut subdirs = Vec::new();
        for entry in entries {
            if state.config.should_skip_hidden(&entry.name)
                || state.config.should_ignore(&entry.name)
                || ignores.as_ref().is_some_and(|frame| frame.matches(&entry.name))
            {
                continue;
            }
            if entry.is_dir {
                subdirs.push(entry.name);
            } else if state.config.matches_target(&entry.name) {
                if !state.try_claim_match() {
                    // Remaining files in this directory and all deeper
                    // subtrees are abandoned.
                    return;
                }
                let path = dir.join(&entry.name);
                let stem = entry
                    .name
                    .rsplit_once('.')
                    .map(|(stem, _)| stem)
                    .unwrap_or(entry.name.as_str())
                    .to_string();
                state
                    .records
                    .insert(path.clone(), IconRecord::new_workspace(stem, &path, &*category));
                state.send_progress(&path);
            }
        }

        if subdirs.is_empty() {
            return;
        }
        if depth + 1 > state.config.max_depth {
            state.mark_truncated();
            return;
        }

        let jobs: Vec<PathBuf> = subdirs.into_iter().map(|name| dir.join(name)).collect();
        let executor = state.executor.clone();
        let next_depth = depth + 1;
        executor
            .run(
                jobs,
                move |subdir| {
                    let state = Arc::clone(&state);
                    let ignores = ignores.clone();
                    Box::pin(async move {
                        walk_dir(state, subdir, next_depth, ignores).await;
                        Ok(())
                    }) as BoxFuture<'static, Result<(), BoxError>>
                },
                None,
            )
            .await;
    })
}
