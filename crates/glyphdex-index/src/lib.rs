//! Multi-source icon index for glyphdex.
//!
//! This crate answers "what icon is this?" and "where does it live?"
//! regardless of which discovery channel produced the record, and
//! extracts icon records from generated library artifacts.
//!
//! # Overview
//!
//! - **Four stores**: workspace files, built/library entries, inline
//!   occurrences, and external references
//! - **Precedence lookup**: library > workspace > inline when names
//!   collide; collisions are resolved at lookup time, never by
//!   refusing to store a record
//! - **Lazy hydration**: graphical content is read from the defining
//!   path on first access and memoized on the record
//! - **Tolerant extraction**: the generated-library extractor is
//!   best-effort, not a strict grammar; malformed entries are skipped
//!   and an unparseable file yields zero records plus a logged cause

mod extract;
mod index;

pub use extract::extract;
pub use index::{IconIndex, hydrate};

// Re-export core types for convenience
pub use glyphdex_core::{IconRecord, SharedRecord, SourceKind, read_record, write_record};
