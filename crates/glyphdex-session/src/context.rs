//! Per-session service registries.
//!
//! These used to be natural candidates for ambient singletons; here
//! they are plain objects constructed once per session and handed to
//! the orchestration layer. Persistence of presets and variants is the
//! embedder's concern; the registries hold in-memory state only.

use compact_str::CompactString;
use indexmap::IndexMap;

use glyphdex_core::{AnimationKind, AnimationSpec, IterationCount};

/// Animation presets assigned to icons by name.
#[derive(Debug, Default)]
pub struct AnimationRegistry {
    assignments: IndexMap<CompactString, AnimationSpec>,
}

impl AnimationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the stock presets under their own names.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.assign("spin", stock_preset(AnimationKind::Spin, 1000, "linear"));
        registry.assign("pulse", stock_preset(AnimationKind::Pulse, 1500, "ease-in-out"));
        registry.assign("bounce", stock_preset(AnimationKind::Bounce, 800, "ease-out"));
        registry.assign("fade", stock_preset(AnimationKind::Fade, 1200, "ease-in-out"));
        registry
    }

    /// Assign a preset to an icon name, replacing any previous one.
    pub fn assign(&mut self, icon: impl Into<CompactString>, spec: AnimationSpec) {
        self.assignments.insert(icon.into(), spec);
    }

    /// Preset assigned to an icon name, if any.
    pub fn preset_for(&self, icon: &str) -> Option<&AnimationSpec> {
        self.assignments.get(icon)
    }

    /// Drop an assignment.
    pub fn unassign(&mut self, icon: &str) -> bool {
        self.assignments.shift_remove(icon).is_some()
    }

    /// Number of assignments held.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no assignments are held.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

fn stock_preset(kind: AnimationKind, duration_ms: u64, timing: &str) -> AnimationSpec {
    AnimationSpec {
        kind,
        duration_ms,
        timing: CompactString::from(timing),
        iteration: IterationCount::Infinite,
        delay_ms: None,
        direction: None,
    }
}

/// Color variants recorded per icon name.
#[derive(Debug, Default)]
pub struct ColorVariantRegistry {
    variants: IndexMap<CompactString, Vec<CompactString>>,
}

impl ColorVariantRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a variant color for an icon. Duplicates are ignored.
    pub fn add_variant(&mut self, icon: impl Into<CompactString>, color: impl Into<CompactString>) {
        let color = color.into();
        let colors = self.variants.entry(icon.into()).or_default();
        if !colors.contains(&color) {
            colors.push(color);
        }
    }

    /// Variant colors recorded for an icon.
    pub fn variants_for(&self, icon: &str) -> &[CompactString] {
        self.variants.get(icon).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop every variant of an icon.
    pub fn clear_icon(&mut self, icon: &str) {
        self.variants.shift_remove(icon);
    }
}

/// The explicit service context one session carries.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub animations: AnimationRegistry,
    pub variants: ColorVariantRegistry,
}

impl SessionContext {
    /// Context with empty registries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the stock animation presets.
    pub fn with_defaults() -> Self {
        Self {
            animations: AnimationRegistry::with_defaults(),
            variants: ColorVariantRegistry::new(),
        }
    }
}
