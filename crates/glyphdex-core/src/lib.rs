//! Core types and traits for glyphdex.
//!
//! This crate provides the fundamental data structures used throughout
//! the glyphdex ecosystem: icon records, scan configuration, scan
//! results, and the issue types collected during discovery.

mod config;
mod issue;
mod record;
mod result;

pub use config::{DEFAULT_IGNORE_NAMES, ScanConfig, ScanConfigBuilder};
pub use issue::{IssueCode, ScanError, ScanIssue};
pub use record::{
    AnimationKind, AnimationSpec, IconRecord, IterationCount, PlayDirection, SharedRecord,
    SourceKind, SourceLocation, UsageSite, read_record, write_record,
};
pub use result::ScanResult;
