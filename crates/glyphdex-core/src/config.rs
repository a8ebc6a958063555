//! Scan configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Directory names skipped by every scan: common build output and
/// dependency caches.
pub const DEFAULT_IGNORE_NAMES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "out",
    "build",
    "target",
    "coverage",
    "vendor",
];

/// Configuration for one scan run. Immutable once built; overrides are
/// applied as a whole-object merge through the builder, never patched
/// field by field.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Maximum simultaneously outstanding I/O operations.
    #[builder(default = "10")]
    #[serde(default = "default_concurrency")]
    pub max_concurrency: usize,

    /// Maximum traversal depth below a root. A file at exactly this
    /// depth is included; entries deeper mark the result truncated.
    #[builder(default = "20")]
    #[serde(default = "default_depth")]
    pub max_depth: u32,

    /// Global ceiling on matched files across the whole run.
    #[builder(default = "5000")]
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Chunk size for batched processing of large item lists.
    #[builder(default = "50")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-item timeout in milliseconds for a single I/O operation.
    #[builder(default = "5000")]
    #[serde(default = "default_timeout_ms")]
    pub file_timeout_ms: u64,

    /// Entry names skipped everywhere, in addition to hidden entries.
    #[builder(default = "default_ignore_names()")]
    #[serde(default = "default_ignore_names")]
    pub ignore_names: Vec<String>,

    /// Per-directory ignore file. Each line is a glob pattern applying
    /// to the directory's subtree.
    #[builder(default = "String::from(\".iconignore\")")]
    #[serde(default = "default_ignore_file")]
    pub ignore_file_name: String,

    /// File extension treated as an asset match, without the dot.
    #[builder(default = "String::from(\"svg\")")]
    #[serde(default = "default_extension")]
    pub target_extension: String,
}

fn default_concurrency() -> usize {
    10
}

fn default_depth() -> u32 {
    20
}

fn default_max_files() -> usize {
    5000
}

fn default_batch_size() -> usize {
    50
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_ignore_names() -> Vec<String> {
    DEFAULT_IGNORE_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_ignore_file() -> String {
    ".iconignore".to_string()
}

fn default_extension() -> String {
    "svg".to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == Some(0) {
            return Err("Concurrency ceiling must be at least 1".to_string());
        }
        if self.max_files == Some(0) {
            return Err("Max files must be at least 1".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("Batch size must be at least 1".to_string());
        }
        if let Some(ref ext) = self.target_extension {
            if ext.is_empty() || ext.starts_with('.') {
                return Err("Target extension must be non-empty, without the dot".to_string());
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Per-item timeout as a duration.
    pub fn file_timeout(&self) -> Duration {
        Duration::from_millis(self.file_timeout_ms)
    }

    /// Check if an entry name is statically ignored.
    pub fn should_ignore(&self, name: &str) -> bool {
        self.ignore_names.iter().any(|n| n == name)
    }

    /// Hidden entries are always skipped.
    pub fn should_skip_hidden(&self, name: &str) -> bool {
        name.starts_with('.')
    }

    /// Check if a file name carries the target extension.
    pub fn matches_target(&self, name: &str) -> bool {
        let Some((stem, ext)) = name.rsplit_once('.') else {
            return false;
        };
        !stem.is_empty() && ext.eq_ignore_ascii_case(&self.target_extension)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
            max_depth: default_depth(),
            max_files: default_max_files(),
            batch_size: default_batch_size(),
            file_timeout_ms: default_timeout_ms(),
            ignore_names: default_ignore_names(),
            ignore_file_name: default_ignore_file(),
            target_extension: default_extension(),
        }
    }
}
