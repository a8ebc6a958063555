//! Icon record types.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which discovery channel produced a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    /// Standalone asset file found in the workspace.
    Workspace,
    /// Entry extracted from a generated library artifact.
    Library,
    /// Markup embedded directly in application source.
    Inline,
    /// Reference to an asset outside the workspace.
    Reference,
}

impl SourceKind {
    /// Lookup precedence when names collide. Lower wins.
    pub fn precedence(&self) -> u8 {
        match self {
            SourceKind::Library => 0,
            SourceKind::Workspace => 1,
            SourceKind::Inline => 2,
            SourceKind::Reference => 3,
        }
    }
}

/// Position of an inline occurrence or reference in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file containing the occurrence.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
    /// 0-based column of the match start.
    pub column: u32,
    /// Length of the matched span in characters.
    pub span: u32,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32, span: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            span,
        }
    }
}

/// One place an icon is used, written by a companion usage scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSite {
    /// File where the usage occurs.
    pub file: PathBuf,
    /// 1-based line number.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

/// Animation archetype assigned to an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AnimationKind {
    Spin,
    Pulse,
    Bounce,
    Fade,
    Shake,
    /// Unrecognized animation type, kept verbatim.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

/// Playback direction for an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PlayDirection {
    Normal,
    Reverse,
    Alternate,
}

/// How many times an animation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IterationCount {
    /// Repeats forever.
    Infinite,
    /// Fixed number of cycles.
    Count(u32),
}

impl IterationCount {
    /// Parse from the textual form used by generated artifacts.
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "infinite" => IterationCount::Infinite,
            other => other
                .parse::<u32>()
                .map(IterationCount::Count)
                .unwrap_or(IterationCount::Infinite),
        }
    }
}

/// Animation descriptor attached to library icons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSpec {
    /// Animation archetype.
    pub kind: AnimationKind,
    /// Duration of one cycle in milliseconds.
    pub duration_ms: u64,
    /// Timing curve, e.g. `linear` or `ease-in-out`.
    pub timing: CompactString,
    /// Repeat count.
    pub iteration: IterationCount,
    /// Delay before the first cycle, if any.
    pub delay_ms: Option<u64>,
    /// Playback direction, if not the default.
    pub direction: Option<PlayDirection>,
}

/// A named graphical asset with a defining source location.
///
/// `defining_path` always identifies where the record's canonical
/// graphical content lives, even before `body` has been hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconRecord {
    /// Display identifier. Not guaranteed globally unique.
    pub name: CompactString,

    /// File that owns this record: a standalone asset file, or the
    /// generated library/sprite file.
    pub defining_path: PathBuf,

    /// Discovery channel that produced the record.
    pub kind: SourceKind,

    /// Derived grouping: folder name or owning file name.
    pub category: CompactString,

    /// Bounding box string, when known.
    pub view_box: Option<CompactString>,

    /// Graphical content. Lazily hydrated and memoized on first read.
    pub body: Option<String>,

    /// Animation descriptor, when the source declares one.
    pub animation: Option<AnimationSpec>,

    /// Source position for inline and reference records.
    pub location: Option<SourceLocation>,

    /// Usage sites, populated by the companion usage scanner.
    pub usages: Vec<UsageSite>,
}

/// Shared mutable handle to a record.
///
/// Mutations go through the handle so any live reference held elsewhere
/// (an open detail view, a cached tree node) observes the new field
/// values without a fresh lookup.
pub type SharedRecord = Arc<RwLock<IconRecord>>;

/// Lock a shared record for reading, recovering the guard if a writer
/// panicked mid-update.
pub fn read_record(record: &SharedRecord) -> std::sync::RwLockReadGuard<'_, IconRecord> {
    record
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Lock a shared record for writing.
pub fn write_record(record: &SharedRecord) -> std::sync::RwLockWriteGuard<'_, IconRecord> {
    record
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl IconRecord {
    /// Create a record for a standalone workspace asset file.
    pub fn new_workspace(
        name: impl Into<CompactString>,
        path: impl Into<PathBuf>,
        category: impl Into<CompactString>,
    ) -> Self {
        Self {
            name: name.into(),
            defining_path: path.into(),
            kind: SourceKind::Workspace,
            category: category.into(),
            view_box: None,
            body: None,
            animation: None,
            location: None,
            usages: Vec::new(),
        }
    }

    /// Create a record for an entry in a generated library artifact.
    pub fn new_library(
        name: impl Into<CompactString>,
        artifact: impl Into<PathBuf>,
        body: String,
        view_box: Option<CompactString>,
        animation: Option<AnimationSpec>,
    ) -> Self {
        let artifact = artifact.into();
        let category = artifact
            .file_stem()
            .map(|s| CompactString::from(s.to_string_lossy()))
            .unwrap_or_default();
        Self {
            name: name.into(),
            defining_path: artifact,
            kind: SourceKind::Library,
            category,
            view_box,
            body: Some(body),
            animation,
            location: None,
            usages: Vec::new(),
        }
    }

    /// Create a record for markup embedded in application source.
    pub fn new_inline(
        name: impl Into<CompactString>,
        location: SourceLocation,
        category: impl Into<CompactString>,
    ) -> Self {
        Self {
            name: name.into(),
            defining_path: location.file.clone(),
            kind: SourceKind::Inline,
            category: category.into(),
            view_box: None,
            body: None,
            animation: None,
            location: Some(location),
            usages: Vec::new(),
        }
    }

    /// Create a record for a reference to an external asset.
    pub fn new_reference(
        name: impl Into<CompactString>,
        target: impl Into<PathBuf>,
        location: SourceLocation,
    ) -> Self {
        Self {
            name: name.into(),
            defining_path: target.into(),
            kind: SourceKind::Reference,
            category: CompactString::const_new("external"),
            view_box: None,
            body: None,
            animation: None,
            location: Some(location),
            usages: Vec::new(),
        }
    }

    /// Wrap the record in a shared handle.
    pub fn into_shared(self) -> SharedRecord {
        Arc::new(RwLock::new(self))
    }

    /// Whether graphical content has been read.
    pub fn is_hydrated(&self) -> bool {
        self.body.is_some()
    }

    /// Number of known usage sites.
    pub fn usage_count(&self) -> usize {
        self.usages.len()
    }

    /// Replace the usage list wholesale. Transient with respect to
    /// presentation identity.
    pub fn set_usages(&mut self, usages: Vec<UsageSite>) {
        self.usages = usages;
    }

    /// Whether this record structurally matches a path: its defining
    /// path, or for inline/reference records the containing source file.
    pub fn matches_path(&self, path: &Path) -> bool {
        if self.defining_path == path {
            return true;
        }
        self.location.as_ref().is_some_and(|loc| loc.file == path)
    }
}
