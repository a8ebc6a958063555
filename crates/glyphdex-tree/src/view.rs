//! Presentation node types and their stable identities.

use std::path::PathBuf;

use compact_str::CompactString;

use glyphdex_core::{IconRecord, SourceKind};

/// Kind of presentation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Top-level grouping, one per source kind.
    Section,
    /// Category grouping under a section.
    Category,
    /// A single icon.
    Icon,
}

/// Stable composite key for a realized presentation node.
///
/// Built only from fields that survive transient updates: two renders
/// of the same record at different times produce the same identity
/// even when usage counts or animation assignment changed in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewNodeIdentity {
    pub node_type: NodeType,
    pub source_kind: SourceKind,
    /// Key of the containing node: the category name for icons, the
    /// section name for categories, empty for sections.
    pub container_key: CompactString,
    pub name: CompactString,
    pub path: PathBuf,
    /// Line number for inline and reference nodes, distinguishing
    /// several occurrences in one file.
    pub line: Option<u32>,
}

impl ViewNodeIdentity {
    /// Identity of a source-kind section node.
    pub fn section(kind: SourceKind) -> Self {
        Self {
            node_type: NodeType::Section,
            source_kind: kind,
            container_key: CompactString::default(),
            name: CompactString::from(kind.to_string()),
            path: PathBuf::new(),
            line: None,
        }
    }

    /// Identity of a category node under a section.
    pub fn category(kind: SourceKind, category: impl Into<CompactString>) -> Self {
        Self {
            node_type: NodeType::Category,
            source_kind: kind,
            container_key: CompactString::from(kind.to_string()),
            name: category.into(),
            path: PathBuf::new(),
            line: None,
        }
    }

    /// Identity of an icon node, derived from the record's stable
    /// fields.
    pub fn icon(record: &IconRecord) -> Self {
        Self {
            node_type: NodeType::Icon,
            source_kind: record.kind,
            container_key: record.category.clone(),
            name: record.name.clone(),
            path: record.defining_path.clone(),
            line: record.location.as_ref().map(|loc| loc.line),
        }
    }
}

/// A realized presentation node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode {
    /// Cache key.
    pub identity: ViewNodeIdentity,
    /// Primary display text.
    pub label: String,
    /// Secondary display text: counts for containers, location for
    /// icons. May change between refreshes of the same identity.
    pub description: String,
    /// Whether the node can have children.
    pub expandable: bool,
}

impl ViewNode {
    /// Realize a section node with its current record count.
    pub fn section(kind: SourceKind, count: usize) -> Self {
        Self {
            identity: ViewNodeIdentity::section(kind),
            label: section_label(kind).to_string(),
            description: count.to_string(),
            expandable: count > 0,
        }
    }

    /// Realize a category node with its current record count.
    pub fn category(kind: SourceKind, category: &str, count: usize) -> Self {
        Self {
            identity: ViewNodeIdentity::category(kind, category),
            label: category.to_string(),
            description: count.to_string(),
            expandable: count > 0,
        }
    }

    /// Realize an icon node from its record.
    pub fn icon(record: &IconRecord) -> Self {
        let description = match (&record.location, record.usage_count()) {
            (Some(loc), _) => format!("{}:{}", loc.file.display(), loc.line),
            (None, 0) => record.defining_path.display().to_string(),
            (None, uses) => format!("{uses} uses"),
        };
        Self {
            identity: ViewNodeIdentity::icon(record),
            label: record.name.to_string(),
            description,
            expandable: false,
        }
    }
}

fn section_label(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Workspace => "Workspace icons",
        SourceKind::Library => "Built library",
        SourceKind::Inline => "Inline occurrences",
        SourceKind::Reference => "External references",
    }
}
