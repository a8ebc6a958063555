//! Asset discovery engine for glyphdex.
//!
//! This crate provides bounded-concurrency traversal of a source tree
//! to find standalone asset files, built on a generic task executor.
//!
//! # Overview
//!
//! `glyphdex-scan` is responsible for walking directories and producing
//! the record set the icon index is populated from. Key features:
//!
//! - **Bounded concurrency**: a concurrency ceiling shared across the
//!   whole recursive descent, not per directory level
//! - **Ignore rules**: a static skip-set for build output plus a
//!   per-directory ignore file with glob patterns
//! - **Ceilings**: traversal depth and a global match count, surfaced
//!   as a sticky `truncated` flag rather than an error
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use glyphdex_scan::{AssetWalker, ScanConfig};
//!
//! # async fn run() {
//! let config = ScanConfig::default();
//! let walker = AssetWalker::new(config).unwrap();
//! let result = walker.scan("/path/to/workspace").await;
//!
//! println!("Found {} icons", result.records.len());
//! if result.truncated {
//!     println!("Scan stopped at a configured ceiling");
//! }
//! # }
//! ```

mod executor;
mod progress;
mod walker;

pub use executor::{BoxError, ProgressFn, TaskExecutor, with_timeout};
pub use progress::WalkProgress;
pub use walker::AssetWalker;

// Re-export core types for convenience
pub use glyphdex_core::{IconRecord, IssueCode, ScanConfig, ScanError, ScanIssue, ScanResult};
