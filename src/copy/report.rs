// src/copy/report.rs

//! Copy pass report.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::errors::{ModsyncError, Result};

/// A single entry that could not be copied.
#[derive(Debug)]
pub struct CopyFailure {
    /// Index of the rule in the pass.
    pub rule: usize,
    /// The offending path: the unreadable source or the unwritable destination.
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{}: {:?}: {}", self.rule, self.path, self.source)
    }
}

/// Counters and per-entry failures for one copy pass.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub files_copied: usize,
    pub dirs_created: usize,
    pub bytes_copied: u64,
    /// Rules whose pattern was malformed or matched nothing.
    pub unmatched_rules: usize,
    pub failures: Vec<CopyFailure>,
}

impl CopyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Fold another report (e.g. one rule's) into this one.
    pub fn merge(&mut self, other: CopyReport) {
        self.files_copied += other.files_copied;
        self.dirs_created += other.dirs_created;
        self.bytes_copied += other.bytes_copied;
        self.unmatched_rules += other.unmatched_rules;
        self.failures.extend(other.failures);
    }

    /// Number of files copied, or the first failure of the pass.
    pub fn into_result(mut self) -> Result<usize> {
        if self.failures.is_empty() {
            return Ok(self.files_copied);
        }
        let failures = self.failures.len();
        let first = self.failures.remove(0);
        Err(ModsyncError::CopyFailed {
            path: first.path,
            source: first.source,
            failures,
        })
    }
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied={} dirs={} bytes={} unmatched_rules={} failures={}",
            self.files_copied,
            self.dirs_created,
            self.bytes_copied,
            self.unmatched_rules,
            self.failures.len()
        )
    }
}
