//! Scan result container.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::issue::ScanIssue;
use crate::record::IconRecord;

/// Output of one walker run. Constructed fresh per scan invocation and
/// immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Discovered records. No ordering is guaranteed across a run;
    /// presentation-time ordering is imposed later.
    pub records: Vec<IconRecord>,

    /// Matching files recorded into the result.
    pub files_scanned: u64,

    /// Directories enumerated during the run.
    pub dirs_visited: u64,

    /// Whether a configured ceiling (depth or match count) was reached
    /// before the whole tree was visited. Sticky for the run.
    pub truncated: bool,

    /// Recoverable per-entry issues, in the order encountered.
    pub issues: Vec<ScanIssue>,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ScanResult {
    /// An empty result, used for missing or ignored roots.
    pub fn empty(duration: Duration) -> Self {
        Self {
            records: Vec::new(),
            files_scanned: 0,
            dirs_visited: 0,
            truncated: false,
            issues: Vec::new(),
            duration,
        }
    }

    /// Whether nothing was found and nothing went wrong.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.issues.is_empty()
    }

    /// Number of issues collected.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}
