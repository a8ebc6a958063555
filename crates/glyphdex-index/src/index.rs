//! Name- and path-keyed lookup across the four discovery channels.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;

use glyphdex_core::{IconRecord, SharedRecord, SourceKind, read_record, write_record};

/// Unified lookup over workspace files, built/library entries, inline
/// occurrences, and external references.
///
/// Name uniqueness is enforced only within a single store; cross-source
/// collisions are resolved at lookup time via the precedence rule
/// (library > workspace > inline), never by refusing to store a record.
///
/// All writers run sequentially in the orchestration layer; a reader
/// mid-scan may observe a partially populated index, which is an
/// accepted trade-off surfaced through the explicit refresh affordance.
#[derive(Debug, Default)]
pub struct IconIndex {
    workspace: IndexMap<CompactString, SharedRecord>,
    library: IndexMap<CompactString, SharedRecord>,
    inline: IndexMap<CompactString, SharedRecord>,
    /// Keyed by the source file containing the reference; one file can
    /// reference many external assets.
    references: IndexMap<PathBuf, Vec<SharedRecord>>,
}

impl IconIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record into its owning store and return the shared
    /// handle. An existing record with the same key is replaced.
    pub fn insert(&mut self, record: IconRecord) -> SharedRecord {
        let handle = record.into_shared();
        self.insert_shared(Arc::clone(&handle));
        handle
    }

    /// Insert an already-shared record into its owning store.
    pub fn insert_shared(&mut self, handle: SharedRecord) {
        let (kind, name, reference_key) = {
            let record = read_record(&handle);
            let key = record
                .location
                .as_ref()
                .map(|loc| loc.file.clone())
                .unwrap_or_else(|| record.defining_path.clone());
            (record.kind, record.name.clone(), key)
        };
        match kind {
            SourceKind::Workspace => {
                self.workspace.insert(name, handle);
            }
            SourceKind::Library => {
                self.library.insert(name, handle);
            }
            SourceKind::Inline => {
                self.inline.insert(name, handle);
            }
            SourceKind::Reference => {
                self.references.entry(reference_key).or_default().push(handle);
            }
        }
    }

    /// Insert every record from an iterator.
    pub fn extend(&mut self, records: impl IntoIterator<Item = IconRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    /// Look an icon up by name. When the same name exists in several
    /// stores the precedence is library > workspace > inline.
    pub fn lookup_by_name(&self, name: &str) -> Option<SharedRecord> {
        self.library
            .get(name)
            .or_else(|| self.workspace.get(name))
            .or_else(|| self.inline.get(name))
            .cloned()
    }

    /// Look an icon up by path. Path is not a map key for most stores,
    /// so this scans all four for a structural match: the defining
    /// path, or for inline/reference records the containing source
    /// file.
    pub fn lookup_by_path(&self, path: impl AsRef<Path>) -> Option<SharedRecord> {
        let path = path.as_ref();
        self.iter_by_precedence()
            .find(|handle| read_record(handle).matches_path(path))
    }

    /// Name lookup falling back to path lookup.
    pub fn find_by_name_or_path(&self, key: &str) -> Option<SharedRecord> {
        self.lookup_by_name(key)
            .or_else(|| self.lookup_by_path(Path::new(key)))
    }

    /// Every record across all four stores, precedence order first.
    pub fn all_icons(&self) -> Vec<SharedRecord> {
        self.iter_by_precedence().collect()
    }

    /// Only the built/library records.
    pub fn built_only(&self) -> Vec<SharedRecord> {
        self.library.values().cloned().collect()
    }

    /// Number of records held for one source kind.
    pub fn count_of(&self, kind: SourceKind) -> usize {
        match kind {
            SourceKind::Workspace => self.workspace.len(),
            SourceKind::Library => self.library.len(),
            SourceKind::Inline => self.inline.len(),
            SourceKind::Reference => self.references.values().map(Vec::len).sum(),
        }
    }

    /// Total records across all stores.
    pub fn len(&self) -> usize {
        self.workspace.len()
            + self.library.len()
            + self.inline.len()
            + self.count_of(SourceKind::Reference)
    }

    /// Whether the index holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records grouped under one category within a source kind.
    pub fn in_category(&self, kind: SourceKind, category: &str) -> Vec<SharedRecord> {
        self.store_iter(kind)
            .filter(|handle| read_record(handle).category == category)
            .collect()
    }

    /// Distinct categories for a source kind, in first-seen order.
    pub fn categories_of(&self, kind: SourceKind) -> Vec<CompactString> {
        let mut seen = Vec::new();
        for handle in self.store_iter(kind) {
            let category = read_record(&handle).category.clone();
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Rename the record found under `old_name`, mutating it in place
    /// so live handles observe the new fields, and moving it between
    /// map keys in its owning store. Targeting a name that no longer
    /// exists is a silent no-op.
    pub fn rename(&mut self, old_name: &str, new_name: &str, new_path: Option<PathBuf>) -> bool {
        let Some(handle) = self.lookup_by_name(old_name) else {
            return false;
        };
        {
            let mut record = write_record(&handle);
            record.name = CompactString::from(new_name);
            if let Some(path) = new_path {
                if record.kind == SourceKind::Workspace {
                    record.category = path
                        .parent()
                        .and_then(|p| p.file_name())
                        .map(|n| CompactString::from(n.to_string_lossy()))
                        .unwrap_or_else(|| record.category.clone());
                }
                record.defining_path = path;
            }
        }
        let kind = read_record(&handle).kind;
        let store = self.store_mut(kind);
        if let Some(store) = store {
            if store
                .get(old_name)
                .is_some_and(|held| Arc::ptr_eq(held, &handle))
            {
                store.shift_remove(old_name);
                store.insert(CompactString::from(new_name), handle);
            }
        }
        true
    }

    /// Remove the record found under `name` from its owning store and
    /// return it. A missing name is a silent no-op.
    pub fn remove(&mut self, name: &str) -> Option<SharedRecord> {
        for kind in [SourceKind::Library, SourceKind::Workspace, SourceKind::Inline] {
            if let Some(store) = self.store_mut(kind) {
                if let Some(handle) = store.shift_remove(name) {
                    return Some(handle);
                }
            }
        }
        None
    }

    /// Drop every reference record attached to a source file.
    pub fn remove_references_in(&mut self, file: &Path) -> usize {
        self.references
            .shift_remove(file)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Clear every store. Re-population is the caller's concern.
    pub fn clear(&mut self) {
        self.workspace.clear();
        self.library.clear();
        self.inline.clear();
        self.references.clear();
    }

    fn store_mut(&mut self, kind: SourceKind) -> Option<&mut IndexMap<CompactString, SharedRecord>> {
        match kind {
            SourceKind::Workspace => Some(&mut self.workspace),
            SourceKind::Library => Some(&mut self.library),
            SourceKind::Inline => Some(&mut self.inline),
            SourceKind::Reference => None,
        }
    }

    fn store_iter(&self, kind: SourceKind) -> Box<dyn Iterator<Item = SharedRecord> + '_> {
        match kind {
            SourceKind::Workspace => Box::new(self.workspace.values().cloned()),
            SourceKind::Library => Box::new(self.library.values().cloned()),
            SourceKind::Inline => Box::new(self.inline.values().cloned()),
            SourceKind::Reference => {
                Box::new(self.references.values().flatten().cloned())
            }
        }
    }

    fn iter_by_precedence(&self) -> impl Iterator<Item = SharedRecord> + '_ {
        self.library
            .values()
            .chain(self.workspace.values())
            .chain(self.inline.values())
            .cloned()
            .chain(self.references.values().flatten().cloned())
    }
}

/// Cache-aside hydration: read the record's graphical content from its
/// defining path on first access and memoize it on the record. The
/// read-through is idempotent; a failed read is logged and leaves the
/// record unhydrated.
pub fn hydrate(record: &SharedRecord) -> Option<String> {
    {
        let guard = read_record(record);
        if let Some(body) = &guard.body {
            return Some(body.clone());
        }
    }
    let path = read_record(record).defining_path.clone();
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            let mut guard = write_record(record);
            let body = guard.body.get_or_insert(text);
            Some(body.clone())
        }
        Err(error) => {
            tracing::debug!(path = %path.display(), %error, "hydration read failed");
            None
        }
    }
}
